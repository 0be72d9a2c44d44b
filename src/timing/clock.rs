use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Monotonic wall-clock reading in seconds.
pub trait TimeSource {
    fn now(&self) -> f64;
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        *self.seconds.lock() += seconds;
    }

    pub fn set(&self, seconds: f64) {
        *self.seconds.lock() = seconds;
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        *self.seconds.lock()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transport {
    Stopped,
    Running,
    Paused { at: f64 },
}

/// Virtual playback time anchored to a wall clock.
///
/// `current_time` is never stored: it is `paused_at` while paused and
/// `(now - anchor) * rate` otherwise.
#[derive(Debug)]
pub struct PlaybackClock<T: TimeSource> {
    source: T,
    absolute_start_time: f64,
    playback_rate: f64,
    transport: Transport,
}

impl<T: TimeSource> PlaybackClock<T> {
    pub fn new(source: T) -> Self {
        let now = source.now();
        Self {
            source,
            absolute_start_time: now,
            playback_rate: 1.0,
            transport: Transport::Paused { at: 0.0 },
        }
    }

    pub fn current_time(&self) -> f64 {
        match self.transport {
            Transport::Paused { at } => at,
            _ => (self.source.now() - self.absolute_start_time) * self.playback_rate,
        }
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    /// Callers guarantee `rate > 0`.
    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.transport, Transport::Paused { .. })
    }

    pub fn is_running(&self) -> bool {
        self.transport == Transport::Running
    }

    /// Re-anchors so that `current_time` reads `time` right now.
    pub fn anchor_at(&mut self, time: f64) {
        self.absolute_start_time = self.source.now() - time / self.playback_rate;
    }

    pub fn pause_at(&mut self, time: f64) {
        self.transport = Transport::Paused { at: time };
    }

    pub fn stop(&mut self) {
        if self.transport == Transport::Running {
            self.transport = Transport::Stopped;
        }
    }

    pub fn clear_pause(&mut self) {
        if self.is_paused() {
            self.transport = Transport::Stopped;
        }
    }

    /// Leaves pause (re-anchoring on the paused time) and marks the
    /// timer as registered.
    pub fn start(&mut self) {
        if let Transport::Paused { at } = self.transport {
            self.anchor_at(at);
        }
        self.transport = Transport::Running;
    }
}
