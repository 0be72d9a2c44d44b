//! Tempo-aware playback of pre-parsed multi-track MIDI recordings.
//!
//! A [`Sequencer`] converts tick timestamps to wall-clock time and emits
//! `midi,..` commands to a renderer through a [`CommandSink`]. It supports
//! seeking with state reconstruction, pause/resume with note restoration,
//! variable playback rate and looping over a tick window.
//! [`spawn_player`] runs one on its own timer thread.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod output;
pub mod recording;
pub mod sequencer;
pub mod timing;

pub use config::PlayerConfig;
pub use engine::{PlayerCommand, PlayerHandle, PlayerUpdate, spawn_player};
pub use error::{Result, SequencerError};
pub use events::{EventKind, MetaKind, TimedEvent};
pub use output::{CommandEmitter, CommandSink, encode_command};
pub use recording::{LoopWindow, Recording};
pub use sequencer::{
    ChannelLatch, ListenerId, SeekTarget, Sequencer, SequencerListener, SoundingNote,
    SoundingNotes,
};
pub use timing::{
    ManualClock, PlaybackClock, SystemClock, TempoMap, TempoPoint, TimeSource, Timeline,
    Transport, format_time,
};
