use std::sync::Arc;

use tracing::debug;

use super::Sequencer;
use crate::events::{CHANNEL_COUNT, NOTE_OFF, NOTE_ON, PITCH_BEND, PROGRAM_CHANGE};
use crate::output::CommandSink;
use crate::timing::{TimeSource, default_seconds_per_tick};

pub const PITCH_BEND_CENTER: u16 = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelLatch {
    pub pitch_bend: u16,
    pub program: u8,
}

impl Default for ChannelLatch {
    fn default() -> Self {
        Self {
            pitch_bend: PITCH_BEND_CENTER,
            program: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Stop once the accumulated time reaches the target.
    Time(f64),
    /// Stop once the next event's tick reaches the target.
    Ticks(u64),
}

impl<S: CommandSink, T: TimeSource> Sequencer<S, T> {
    /// Silently replays the timeline from the start up to `target`.
    ///
    /// Notes are skipped, pitch bends and program changes are latched per
    /// channel and sent once at the end, everything else goes through
    /// the regular event path. Leaves `event_index` on the first event
    /// at or past the target.
    pub(super) fn play_to(&mut self, target: SeekTarget) {
        self.played_time = 0.0;
        self.event_index = 0;
        self.seconds_per_tick = default_seconds_per_tick(self.tempo_map.time_division());
        self.emitter.silence_all();

        let mut latches = [ChannelLatch::default(); CHANNEL_COUNT as usize];
        let timeline = Arc::clone(&self.timeline);
        let events = timeline.events();

        while let Some(event) = events.get(self.event_index) {
            let reached = match target {
                SeekTarget::Time(time) => self.played_time >= time,
                SeekTarget::Ticks(tick) => event.tick >= tick,
            };
            if reached {
                break;
            }

            match (event.message_type(), event.channel_number()) {
                (Some(NOTE_ON | NOTE_OFF), _) => {}
                (Some(PITCH_BEND), Some(channel)) => {
                    latches[channel as usize].pitch_bend =
                        ((event.data_byte(1) as u16) << 7) | event.data_byte(0) as u16;
                }
                (Some(PROGRAM_CHANGE), Some(channel)) => {
                    latches[channel as usize].program = event.data_byte(0);
                }
                _ => self.process_event(event),
            }

            self.event_index += 1;
            if let Some(next) = events.get(self.event_index) {
                self.played_time += self.seconds_per_tick * (next.tick - event.tick) as f64;
            }
        }

        for (channel, latch) in latches.iter().enumerate() {
            self.emitter.pitch_bend(channel as u8, latch.pitch_bend);
            self.emitter.program_change(channel as u8, latch.program);
        }

        debug!(
            "fast-forwarded to {:?}: index {}, {:.3}s",
            target, self.event_index, self.played_time
        );
    }
}
