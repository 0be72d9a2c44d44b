mod clock;
mod tempo;
mod timeline;

pub use clock::{ManualClock, PlaybackClock, SystemClock, TimeSource, Transport};
pub use tempo::{
    DEFAULT_BPM, DEFAULT_MICROS_PER_QUARTER, TempoMap, TempoPoint, default_seconds_per_tick,
    seconds_per_tick,
};
pub use timeline::Timeline;

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
