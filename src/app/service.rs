//! Now-playing service.
//!
//! One task owns the [`QueueController`] and the [`NowPlayingProjector`] and
//! applies commands strictly in arrival order. Artwork is resolved on spawned
//! tasks that post their result back into the same command channel, so a
//! completion can never interleave with a reorder or a song change.

use crate::app::events::Command;
use crate::artwork::{ArtworkRequest, ArtworkResolver};
use crate::error::ServiceError;
use crate::history::{HistoryStore, PlaylistStore};
use crate::projector::{NowPlayingProjector, Projection};
use crate::queue::{QueueController, QueueSnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

const COMMAND_BUFFER: usize = 64;

/// External stores the service writes to; either may be absent.
#[derive(Default, Clone)]
pub struct Stores {
    pub history: Option<Arc<dyn HistoryStore>>,
    pub playlists: Option<Arc<dyn PlaylistStore>>,
}

pub struct NowPlayingService {
    controller: QueueController,
    projector: NowPlayingProjector,
    resolver: Arc<dyn ArtworkResolver>,
    stores: Stores,
    // Current song was (re)started but has not been heard yet.
    unrecorded: bool,
    // Weak so that dropping every handle still ends the task.
    commands: mpsc::WeakSender<Command>,
    projection: watch::Sender<Projection>,
}

impl NowPlayingService {
    pub fn spawn(
        controller: QueueController,
        projector: NowPlayingProjector,
        resolver: Arc<dyn ArtworkResolver>,
        stores: Stores,
    ) -> (ServiceHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (projection_tx, projection_rx) = watch::channel(Projection::Dismiss);

        let service = Self {
            controller,
            projector,
            resolver,
            stores,
            unrecorded: false,
            commands: tx.downgrade(),
            projection: projection_tx,
        };
        let task = tokio::spawn(service.run(rx));

        (
            ServiceHandle {
                tx,
                projection: projection_rx,
            },
            task,
        )
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!(len = self.controller.len(), "now-playing service started");
        self.follow_queue(true);

        while let Some(command) = rx.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        self.projection.send_replace(Projection::Dismiss);
        info!("now-playing service stopped");
    }

    /// Returns `false` once the service should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Reorder { from, to, reply } => {
                let result = self.controller.reorder(from, to);
                if result.is_ok() {
                    self.follow_queue(false);
                }
                let _ = reply.send(result);
            }
            Command::PlayAt { index, reply } => {
                let result = self.controller.play_at(index);
                if result.is_ok() {
                    self.follow_queue(true);
                }
                let _ = reply.send(result);
            }
            Command::Skip { reply } => {
                let result = self.controller.skip();
                if result.is_ok() {
                    self.follow_queue(true);
                }
                let _ = reply.send(result);
            }
            Command::Rewind { reply } => {
                let result = self.controller.rewind();
                if result.is_ok() {
                    self.follow_queue(true);
                }
                let _ = reply.send(result);
            }
            Command::SetPlaying { playing, reply } => {
                let result = self.controller.set_playing(playing);
                if result.is_ok() {
                    self.publish_playing();
                }
                let _ = reply.send(result);
            }
            Command::TogglePause { reply } => {
                let result = self.controller.toggle_playing();
                if result.is_ok() {
                    self.publish_playing();
                }
                let _ = reply.send(result);
            }
            Command::SetColored { enabled, reply } => {
                let projection = self.projector.set_colored(enabled);
                self.publish(projection);
                let _ = reply.send(());
            }
            Command::Refresh { reply } => {
                let result = self.controller.sync();
                if result.is_ok() {
                    self.follow_queue(true);
                }
                let _ = reply.send(result);
            }
            Command::SaveQueue { name, reply } => {
                let _ = reply.send(self.save_queue(&name));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.controller.snapshot());
            }
            Command::ArtworkDone { ticket, result } => {
                let projection = match result {
                    Ok(artwork) => self.projector.on_artwork_resolved(&ticket, artwork),
                    Err(e) => {
                        debug!(song_id = ticket.song.id, "artwork unavailable: {}", e);
                        self.projector.on_artwork_failed(&ticket)
                    }
                };
                if let Some(projection) = projection {
                    self.publish(projection);
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    /// Re-project after a queue mutation. Artwork is only re-requested when the
    /// current song changed or playback was restarted.
    fn follow_queue(&mut self, restarted: bool) {
        let song = self.controller.current_song();
        let changed = match self.projector.current_song() {
            Some(current) => !current.same_identity(&song),
            None => !song.is_empty(),
        };
        if !changed && !restarted {
            return;
        }

        self.unrecorded = !song.is_empty();
        let change = self
            .projector
            .on_queue_changed(song, self.controller.is_playing());
        self.publish(change.projection);
        if let Some(request) = change.request {
            self.dispatch(request);
        }
        self.record_if_playing();
    }

    fn publish_playing(&mut self) {
        let projection = self.projector.on_playing_changed(self.controller.is_playing());
        self.publish(projection);
        self.record_if_playing();
    }

    fn publish(&self, projection: Projection) {
        trace!(?projection, "publishing projection");
        self.projection.send_replace(projection);
    }

    /// History is written once per (re)start, when playback actually runs.
    fn record_if_playing(&mut self) {
        if !self.unrecorded || !self.controller.is_playing() {
            return;
        }
        self.unrecorded = false;
        let song = self.controller.current_song();
        if let Some(history) = &self.stores.history {
            if let Err(e) = history.record(&song) {
                warn!(song_id = song.id, "could not record play history: {:#}", e);
            }
        }
    }

    fn save_queue(&self, name: &str) -> Result<usize, ServiceError> {
        let Some(playlists) = &self.stores.playlists else {
            return Err(ServiceError::Store("no playlist store configured".to_string()));
        };
        let songs = self.controller.songs();
        playlists
            .add_songs(name, songs)
            .map_err(|e| ServiceError::Store(format!("{:#}", e)))?;
        info!(playlist = name, songs = songs.len(), "queue saved as playlist");
        Ok(songs.len())
    }

    fn dispatch(&self, request: ArtworkRequest) {
        let pending = self.resolver.resolve(&request);
        let commands = self.commands.clone();
        let ticket = request.ticket;

        tokio::spawn(async move {
            let result = pending.await;
            // Service gone: nobody left to show the result to.
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(Command::ArtworkDone { ticket, result }).await;
            }
        });
    }
}

/// Cloneable front door to the service task.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<Command>,
    projection: watch::Receiver<Projection>,
}

impl ServiceHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), ServiceError> {
        Ok(self
            .request(|reply| Command::Reorder { from, to, reply })
            .await??)
    }

    pub async fn play_at(&self, index: usize) -> Result<(), ServiceError> {
        Ok(self.request(|reply| Command::PlayAt { index, reply }).await??)
    }

    pub async fn skip(&self) -> Result<(), ServiceError> {
        Ok(self.request(|reply| Command::Skip { reply }).await??)
    }

    pub async fn rewind(&self) -> Result<(), ServiceError> {
        Ok(self.request(|reply| Command::Rewind { reply }).await??)
    }

    pub async fn set_playing(&self, playing: bool) -> Result<(), ServiceError> {
        Ok(self
            .request(|reply| Command::SetPlaying { playing, reply })
            .await??)
    }

    /// Returns the new playing flag.
    pub async fn toggle_pause(&self) -> Result<bool, ServiceError> {
        Ok(self.request(|reply| Command::TogglePause { reply }).await??)
    }

    pub async fn set_colored(&self, enabled: bool) -> Result<(), ServiceError> {
        self.request(|reply| Command::SetColored { enabled, reply })
            .await
    }

    pub async fn refresh(&self) -> Result<(), ServiceError> {
        Ok(self.request(|reply| Command::Refresh { reply }).await??)
    }

    /// Append the whole queue, in queue order, to playlist `name`.
    /// Returns the number of songs written.
    pub async fn save_queue_as(&self, name: &str) -> Result<usize, ServiceError> {
        let name = name.to_string();
        self.request(|reply| Command::SaveQueue { name, reply })
            .await?
    }

    pub async fn queue_snapshot(&self) -> Result<QueueSnapshot, ServiceError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Latest projection; superseded ones are never replayed.
    pub fn subscribe(&self) -> watch::Receiver<Projection> {
        self.projection.clone()
    }

    pub fn projection(&self) -> Projection {
        self.projection.borrow().clone()
    }

    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| ServiceError::Closed)
    }
}
