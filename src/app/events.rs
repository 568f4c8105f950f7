use crate::artwork::{Artwork, ArtworkTicket};
use crate::error::{ArtworkError, QueueResult, ServiceError};
use crate::queue::QueueSnapshot;
use tokio::sync::oneshot;

/// Everything the owner task reacts to. Replies go back on the enclosed channel.
pub enum Command {
    Reorder {
        from: usize,
        to: usize,
        reply: oneshot::Sender<QueueResult<()>>,
    },
    PlayAt {
        index: usize,
        reply: oneshot::Sender<QueueResult<()>>,
    },
    Skip {
        reply: oneshot::Sender<QueueResult<()>>,
    },
    Rewind {
        reply: oneshot::Sender<QueueResult<()>>,
    },
    SetPlaying {
        playing: bool,
        reply: oneshot::Sender<QueueResult<()>>,
    },
    TogglePause {
        reply: oneshot::Sender<QueueResult<bool>>,
    },
    SetColored {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    /// Re-read queue and position from the playback engine.
    Refresh {
        reply: oneshot::Sender<QueueResult<()>>,
    },
    /// Write the current queue to a named playlist.
    SaveQueue {
        name: String,
        reply: oneshot::Sender<Result<usize, ServiceError>>,
    },
    Snapshot {
        reply: oneshot::Sender<QueueSnapshot>,
    },
    /// Posted by the artwork task, never by callers.
    ArtworkDone {
        ticket: ArtworkTicket,
        result: Result<Artwork, ArtworkError>,
    },
    Shutdown,
}
