use crate::events::{
    ALL_NOTES_OFF, ALL_SOUND_OFF, CHANNEL_COUNT, CONTROLLER_CHANGE, NOTE_ON, PITCH_BEND,
    PROGRAM_CHANGE,
};
use crossbeam::channel::Sender;
use tracing::trace;

/// Write-only, fire-and-forget channel to the renderer.
pub trait CommandSink {
    fn post(&mut self, message: String);
}

impl CommandSink for Sender<String> {
    fn post(&mut self, message: String) {
        if self.send(message).is_err() {
            trace!("renderer channel disconnected, dropping command");
        }
    }
}

/// `midi,<status>,<data>...` with unpadded lowercase hex tokens.
pub fn encode_command(bytes: &[u8]) -> String {
    let mut out = String::from("midi");
    for byte in bytes {
        out.push(',');
        out.push_str(&format!("{:x}", byte));
    }
    out
}

pub struct CommandEmitter<S: CommandSink> {
    sink: S,
}

impl<S: CommandSink> CommandEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn emit(&mut self, bytes: &[u8]) {
        self.sink.post(encode_command(bytes));
    }

    pub fn emit_with_status(&mut self, status: u8, data: &[u8]) {
        let mut bytes = Vec::with_capacity(data.len() + 1);
        bytes.push(status);
        bytes.extend_from_slice(data);
        self.emit(&bytes);
    }

    pub fn note_on(&mut self, channel: u8, key: u8, velocity: u8) {
        self.emit(&[(NOTE_ON << 4) | channel, key, velocity]);
    }

    pub fn pitch_bend(&mut self, channel: u8, value: u16) {
        self.emit(&[
            (PITCH_BEND << 4) | channel,
            (value & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
        ]);
    }

    pub fn program_change(&mut self, channel: u8, program: u8) {
        self.emit(&[(PROGRAM_CHANGE << 4) | channel, program]);
    }

    /// Sends all sound off and all notes off on every channel.
    pub fn silence_all(&mut self) {
        for channel in 0..CHANNEL_COUNT {
            self.emit(&[(CONTROLLER_CHANGE << 4) | channel, ALL_SOUND_OFF, 0]);
            self.emit(&[(CONTROLLER_CHANGE << 4) | channel, ALL_NOTES_OFF, 0]);
        }
    }
}
