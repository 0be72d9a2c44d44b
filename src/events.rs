use serde::{Deserialize, Serialize};

pub const NOTE_OFF: u8 = 0x8;
pub const NOTE_ON: u8 = 0x9;
pub const CONTROLLER_CHANGE: u8 = 0xB;
pub const PROGRAM_CHANGE: u8 = 0xC;
pub const PITCH_BEND: u8 = 0xE;

pub const ALL_SOUND_OFF: u8 = 0x78;
pub const ALL_NOTES_OFF: u8 = 0x7B;

pub const CHANNEL_COUNT: u8 = 16;

/// Meta and system messages that never reach the renderer directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaKind {
    SequenceNumber,
    Text,
    Copyright,
    TrackName,
    InstrumentName,
    Lyric,
    Marker,
    CuePoint,
    ChannelPrefix,
    Port,
    EndOfTrack,
    SetTempo,
    SmpteOffset,
    TimeSignature,
    KeySignature,
    SongPosition,
    ActiveSensing,
    SequencerSpecific,
    Unknown(u8),
}

impl MetaKind {
    pub fn from_type_byte(byte: u8) -> Self {
        match byte {
            0x00 => MetaKind::SequenceNumber,
            0x01 => MetaKind::Text,
            0x02 => MetaKind::Copyright,
            0x03 => MetaKind::TrackName,
            0x04 => MetaKind::InstrumentName,
            0x05 => MetaKind::Lyric,
            0x06 => MetaKind::Marker,
            0x07 => MetaKind::CuePoint,
            0x20 => MetaKind::ChannelPrefix,
            0x21 => MetaKind::Port,
            0x2F => MetaKind::EndOfTrack,
            0x51 => MetaKind::SetTempo,
            0x54 => MetaKind::SmpteOffset,
            0x58 => MetaKind::TimeSignature,
            0x59 => MetaKind::KeySignature,
            0x7F => MetaKind::SequencerSpecific,
            other => MetaKind::Unknown(other),
        }
    }

    /// Text-class events are handed to listeners rather than dropped.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            MetaKind::Text
                | MetaKind::Lyric
                | MetaKind::Copyright
                | MetaKind::TrackName
                | MetaKind::Marker
                | MetaKind::CuePoint
                | MetaKind::InstrumentName
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Status byte carries the message type in the high nibble and the
    /// channel in the low nibble.
    Channel { status: u8 },
    SystemExclusive,
    Meta(MetaKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub tick: u64,
    pub kind: EventKind,
    pub data: Vec<u8>,
}

impl TimedEvent {
    pub fn channel(tick: u64, status: u8, data: Vec<u8>) -> Self {
        Self {
            tick,
            kind: EventKind::Channel { status },
            data,
        }
    }

    pub fn meta(tick: u64, kind: MetaKind, data: Vec<u8>) -> Self {
        Self {
            tick,
            kind: EventKind::Meta(kind),
            data,
        }
    }

    pub fn note_on(tick: u64, channel: u8, key: u8, velocity: u8) -> Self {
        Self::channel(tick, (NOTE_ON << 4) | (channel & 0x0F), vec![key, velocity])
    }

    pub fn note_off(tick: u64, channel: u8, key: u8) -> Self {
        Self::channel(tick, (NOTE_OFF << 4) | (channel & 0x0F), vec![key, 0])
    }

    pub fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self::channel(tick, (PROGRAM_CHANGE << 4) | (channel & 0x0F), vec![program])
    }

    pub fn pitch_bend(tick: u64, channel: u8, value: u16) -> Self {
        Self::channel(
            tick,
            (PITCH_BEND << 4) | (channel & 0x0F),
            vec![(value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8],
        )
    }

    pub fn controller(tick: u64, channel: u8, controller: u8, value: u8) -> Self {
        Self::channel(
            tick,
            (CONTROLLER_CHANGE << 4) | (channel & 0x0F),
            vec![controller, value],
        )
    }

    pub fn tempo(tick: u64, micros_per_quarter: u32) -> Self {
        let bytes = micros_per_quarter.to_be_bytes();
        Self::meta(tick, MetaKind::SetTempo, bytes[1..].to_vec())
    }

    /// High nibble of the status byte, `None` for non-channel events.
    pub fn message_type(&self) -> Option<u8> {
        match self.kind {
            EventKind::Channel { status } => Some(status >> 4),
            _ => None,
        }
    }

    pub fn channel_number(&self) -> Option<u8> {
        match self.kind {
            EventKind::Channel { status } => Some(status & 0x0F),
            _ => None,
        }
    }

    pub fn data_byte(&self, idx: usize) -> u8 {
        self.data.get(idx).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_helpers() {
        let event = TimedEvent::note_on(0, 3, 60, 100);
        assert_eq!(event.kind, EventKind::Channel { status: 0x93 });
        assert_eq!(event.message_type(), Some(NOTE_ON));
        assert_eq!(event.channel_number(), Some(3));

        let bend = TimedEvent::pitch_bend(0, 1, 0x3FFF);
        assert_eq!(bend.data, vec![0x7F, 0x7F]);
    }

    #[test]
    fn test_meta_kind_mapping() {
        assert_eq!(MetaKind::from_type_byte(0x51), MetaKind::SetTempo);
        assert_eq!(MetaKind::from_type_byte(0x05), MetaKind::Lyric);
        assert_eq!(MetaKind::from_type_byte(0x42), MetaKind::Unknown(0x42));
        assert!(MetaKind::Marker.is_text());
        assert!(!MetaKind::TimeSignature.is_text());
    }

    #[test]
    fn test_tempo_payload_is_24_bit() {
        let event = TimedEvent::tempo(0, 500_000);
        assert_eq!(event.data, vec![0x07, 0xA1, 0x20]);
        assert_eq!(event.message_type(), None);
    }
}
