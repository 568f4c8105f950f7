//! Presentation seam for the now-playing notification.

use crate::projector::{ArtworkState, NowPlayingSnapshot, PlayPause, Projection};
use std::io::Write;
use tokio::sync::watch;
use tracing::debug;

pub trait NotificationPresenter: Send {
    fn present(&mut self, snapshot: &NowPlayingSnapshot);
    fn dismiss(&mut self);
}

/// Render every projection published on `rx` until the service goes away.
pub async fn run_presenter<P: NotificationPresenter>(
    mut rx: watch::Receiver<Projection>,
    mut presenter: P,
) -> P {
    let mut showing = false;
    loop {
        let projection = rx.borrow_and_update().clone();
        match projection {
            Projection::Show(snapshot) => {
                presenter.present(&snapshot);
                showing = true;
            }
            Projection::Dismiss if showing => {
                presenter.dismiss();
                showing = false;
            }
            Projection::Dismiss => {}
        }
        if rx.changed().await.is_err() {
            debug!("projection channel closed, presenter exiting");
            return presenter;
        }
    }
}

/// One line per update, for the terminal driver.
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(snapshot: &NowPlayingSnapshot) -> String {
        let glyph = match snapshot.play_pause {
            PlayPause::Pause => "⏸",
            PlayPause::Play => "▶",
        };
        let art = match &snapshot.artwork {
            ArtworkState::Loading => "art: loading".to_string(),
            ArtworkState::Loaded(artwork) => format!(
                "art: {}x{}",
                artwork.image.width(),
                artwork.image.height()
            ),
            ArtworkState::Failed => "art: default".to_string(),
        };
        let text = if snapshot.use_dark_text { "dark" } else { "light" };
        format!(
            "{} {} - {} [{}] | {} | bg {} | {} text",
            glyph,
            snapshot.song.title,
            snapshot.song.artist_name,
            snapshot.song.album_name,
            art,
            snapshot.background,
            text
        )
    }
}

impl<W: Write + Send> NotificationPresenter for TerminalPresenter<W> {
    fn present(&mut self, snapshot: &NowPlayingSnapshot) {
        if let Err(e) = writeln!(self.out, "{}", Self::render(snapshot)) {
            debug!(song_id = snapshot.song.id, "could not write notification: {}", e);
        }
    }

    fn dismiss(&mut self) {
        if let Err(e) = writeln!(self.out, "(notification dismissed)") {
            debug!("could not write dismissal: {}", e);
        }
    }
}
