use thiserror::Error;

#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("No tracks supplied")]
    NoTracks,

    #[error("Recording contains no events")]
    EmptyTimeline,

    #[error("Invalid time division: {0} ticks per quarter note")]
    InvalidTimeDivision(u16),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Failed to serialize RON: {0}")]
    RonSerialize(#[from] ron::Error),
}

pub type Result<T> = std::result::Result<T, SequencerError>;
