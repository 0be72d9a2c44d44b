use std::collections::BTreeMap;

use crate::events::{NOTE_OFF, NOTE_ON, TimedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundingNote {
    pub channel: u8,
    pub key: u8,
    pub velocity: u8,
}

/// Notes dispatched since the last seek or stop that have not been
/// released yet. One entry per (channel, key).
#[derive(Debug, Clone, Default)]
pub struct SoundingNotes {
    notes: BTreeMap<(u8, u8), u8>,
}

impl SoundingNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the set from a dispatched channel event. Note-on with
    /// velocity 0 counts as note-off.
    pub fn track(&mut self, event: &TimedEvent) {
        let (Some(kind), Some(channel)) = (event.message_type(), event.channel_number()) else {
            return;
        };
        let key = event.data_byte(0);
        let velocity = event.data_byte(1);

        match kind {
            NOTE_ON if velocity > 0 => {
                self.notes.insert((channel, key), velocity);
            }
            NOTE_ON | NOTE_OFF => {
                self.notes.remove(&(channel, key));
            }
            _ => {}
        }
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, channel: u8, key: u8) -> bool {
        self.notes.contains_key(&(channel, key))
    }

    pub fn iter(&self) -> impl Iterator<Item = SoundingNote> + '_ {
        self.notes
            .iter()
            .map(|(&(channel, key), &velocity)| SoundingNote {
                channel,
                key,
                velocity,
            })
    }
}
