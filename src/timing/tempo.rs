use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoPoint {
    pub tick: u64,
    pub micros_per_quarter: u32,
}

impl TempoPoint {
    pub fn new(tick: u64, micros_per_quarter: u32) -> Self {
        Self {
            tick,
            micros_per_quarter,
        }
    }

    pub fn bpm(&self) -> f64 {
        if self.micros_per_quarter == 0 {
            return 0.0;
        }
        60_000_000.0 / self.micros_per_quarter as f64
    }
}

/// Seconds per tick at the given tempo, falling back to 120 BPM for a
/// tempo that would yield a non-positive duration.
pub fn seconds_per_tick(micros_per_quarter: u32, time_division: u16) -> f64 {
    let seconds = micros_per_quarter as f64 / (1_000_000.0 * time_division as f64);
    if seconds > 0.0 && seconds.is_finite() {
        seconds
    } else {
        warn!("invalid tempo! falling back to {} BPM", DEFAULT_BPM);
        default_seconds_per_tick(time_division)
    }
}

pub fn default_seconds_per_tick(time_division: u16) -> f64 {
    60.0 / (DEFAULT_BPM * time_division as f64)
}

/// Piecewise-linear tick to seconds mapping. Read-only once built.
#[derive(Debug, Clone)]
pub struct TempoMap {
    points: Vec<TempoPoint>,
    time_division: u16,
}

impl TempoMap {
    /// `points` are expected sorted by tick. A default 120 BPM point is
    /// inserted at tick 0 when the list does not cover it.
    pub fn new(mut points: Vec<TempoPoint>, time_division: u16) -> Self {
        points.sort_by_key(|p| p.tick);
        if points.first().is_none_or(|p| p.tick > 0) {
            points.insert(0, TempoPoint::new(0, DEFAULT_MICROS_PER_QUARTER));
        }
        Self {
            points,
            time_division,
        }
    }

    pub fn time_division(&self) -> u16 {
        self.time_division
    }

    pub fn points(&self) -> &[TempoPoint] {
        &self.points
    }

    /// Tempo point in effect at `tick`.
    pub fn tempo_at(&self, tick: u64) -> TempoPoint {
        let idx = self.points.partition_point(|p| p.tick <= tick);
        self.points[idx.saturating_sub(1)]
    }

    /// Accumulates segment durations forward over every tempo point
    /// strictly before `tick`.
    pub fn ticks_to_seconds(&self, tick: u64) -> f64 {
        if tick == 0 {
            return 0.0;
        }

        let mut seconds = 0.0;
        for (i, point) in self.points.iter().enumerate() {
            if point.tick >= tick {
                break;
            }
            let segment_end = match self.points.get(i + 1) {
                Some(next) if next.tick < tick => next.tick,
                _ => tick,
            };
            let spt = seconds_per_tick(point.micros_per_quarter, self.time_division);
            seconds += (segment_end - point.tick) as f64 * spt;
        }
        seconds
    }
}
