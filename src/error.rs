//! Error types for the queue, artwork and service layers.
//!
//! A stale artwork result is deliberately absent here: it is dropped by the
//! projector and never surfaces as an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Index outside `[0, len)`. Raised before anything is mutated.
    #[error("queue index {index} out of range (queue length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Stepped back from the first song.
    #[error("already at the start of the queue (queue length {len})")]
    BeforeStart { len: usize },

    /// The playback engine rejected a forwarded command.
    #[error("playback engine error: {0}")]
    Engine(String),
}

#[derive(Error, Debug)]
pub enum ArtworkError {
    #[error("no artwork found: {0}")]
    NotFound(String),

    #[error("artwork read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("artwork download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("artwork decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// No playlist store is configured, or it rejected the write.
    #[error("store error: {0}")]
    Store(String),

    /// The owner task has stopped and no longer accepts commands.
    #[error("now-playing service is not running")]
    Closed,
}

pub type QueueResult<T> = std::result::Result<T, QueueError>;
