//! Now-playing projection.
//!
//! Turns the current song, playing flag and the latest artwork result into a
//! [`NowPlayingSnapshot`]. Artwork results are matched against the song they
//! were requested for; anything issued for a song that is no longer current
//! is dropped.

use crate::artwork::{Artwork, ArtworkRequest, ArtworkTicket};
use crate::player::Song;
use crate::theme::{self, Color};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkState {
    /// Request in flight; show the placeholder.
    Loading,
    Loaded(Artwork),
    /// Nothing found; placeholder image on a transparent background.
    Failed,
}

impl ArtworkState {
    pub fn artwork(&self) -> Option<&Artwork> {
        match self {
            ArtworkState::Loaded(artwork) => Some(artwork),
            _ => None,
        }
    }
}

/// Which transport glyph the play/pause button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayPause {
    Play,
    Pause,
}

impl PlayPause {
    pub fn for_state(is_playing: bool) -> Self {
        if is_playing {
            PlayPause::Pause
        } else {
            PlayPause::Play
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingSnapshot {
    pub song: Song,
    pub is_playing: bool,
    pub play_pause: PlayPause,
    pub artwork: ArtworkState,
    /// Effective background: the accent when colored and loaded, else transparent.
    pub background: Color,
    pub use_dark_text: bool,
    /// Bumped on every change; a higher revision supersedes a lower one.
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Projection {
    Show(NowPlayingSnapshot),
    /// Nothing is queued; tear down any displayed notification.
    #[default]
    Dismiss,
}

impl Projection {
    pub fn snapshot(&self) -> Option<&NowPlayingSnapshot> {
        match self {
            Projection::Show(snapshot) => Some(snapshot),
            Projection::Dismiss => None,
        }
    }
}

/// Result of a song change: the placeholder projection and, unless the queue
/// is empty, the artwork request to dispatch.
#[derive(Debug, Clone)]
pub struct SongChange {
    pub projection: Projection,
    pub request: Option<ArtworkRequest>,
}

pub struct NowPlayingProjector {
    song: Option<Song>,
    is_playing: bool,
    colored: bool,
    platform_dark_text: bool,
    artwork: ArtworkState,
    generation: u64,
    revision: u64,
}

impl NowPlayingProjector {
    pub fn new(colored: bool, platform_dark_text: bool) -> Self {
        Self {
            song: None,
            is_playing: false,
            colored,
            platform_dark_text,
            artwork: ArtworkState::Failed,
            generation: 0,
            revision: 0,
        }
    }

    pub fn on_queue_changed(&mut self, song: Song, is_playing: bool) -> SongChange {
        self.is_playing = is_playing;
        if song.is_empty() {
            self.song = None;
            self.artwork = ArtworkState::Failed;
            return SongChange {
                projection: self.emit(),
                request: None,
            };
        }

        self.generation += 1;
        let request = ArtworkRequest::for_song(&song, self.generation);
        debug!(song_id = song.id, generation = self.generation, "now playing changed");
        self.song = Some(song);
        self.artwork = ArtworkState::Loading;

        SongChange {
            projection: self.emit(),
            request: Some(request),
        }
    }

    /// `None` when the result is stale and was dropped.
    pub fn on_artwork_resolved(&mut self, ticket: &ArtworkTicket, artwork: Artwork) -> Option<Projection> {
        if !self.is_current(ticket) {
            return None;
        }
        self.artwork = ArtworkState::Loaded(artwork);
        Some(self.emit())
    }

    /// `None` when the failure is stale and was dropped.
    pub fn on_artwork_failed(&mut self, ticket: &ArtworkTicket) -> Option<Projection> {
        if !self.is_current(ticket) {
            return None;
        }
        self.artwork = ArtworkState::Failed;
        Some(self.emit())
    }

    pub fn set_colored(&mut self, enabled: bool) -> Projection {
        self.colored = enabled;
        self.emit()
    }

    pub fn on_playing_changed(&mut self, is_playing: bool) -> Projection {
        self.is_playing = is_playing;
        self.emit()
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    /// The projection for the current state, without bumping the revision.
    pub fn projection(&self) -> Projection {
        self.build(self.revision)
    }

    fn is_current(&self, ticket: &ArtworkTicket) -> bool {
        let current = self
            .song
            .as_ref()
            .is_some_and(|song| song.same_identity(&ticket.song));
        if !current {
            debug!(
                song_id = ticket.song.id,
                generation = ticket.generation,
                "dropping stale artwork result"
            );
        }
        current
    }

    fn background(&self) -> Color {
        match &self.artwork {
            ArtworkState::Loaded(artwork) if self.colored => artwork.accent,
            _ => Color::TRANSPARENT,
        }
    }

    fn emit(&mut self) -> Projection {
        self.revision += 1;
        self.build(self.revision)
    }

    fn build(&self, revision: u64) -> Projection {
        let Some(song) = &self.song else {
            return Projection::Dismiss;
        };
        let background = self.background();
        Projection::Show(NowPlayingSnapshot {
            song: song.clone(),
            is_playing: self.is_playing,
            play_pause: PlayPause::for_state(self.is_playing),
            artwork: self.artwork.clone(),
            background,
            use_dark_text: theme::use_dark_text(background, self.platform_dark_text),
            revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn song(id: i64) -> Song {
        Song::new(id, &format!("Song {}", id), "Artist", "Album", 100 + id)
    }

    fn art(px: [u8; 4]) -> Artwork {
        Artwork::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba(px))))
    }

    fn snapshot(p: Projection) -> NowPlayingSnapshot {
        match p {
            Projection::Show(s) => s,
            Projection::Dismiss => panic!("expected a snapshot"),
        }
    }

    #[test]
    fn test_queue_change_emits_placeholder_and_request() {
        let mut projector = NowPlayingProjector::new(true, true);
        let change = projector.on_queue_changed(song(1), true);

        let snap = snapshot(change.projection);
        assert_eq!(snap.song.id, 1);
        assert_eq!(snap.artwork, ArtworkState::Loading);
        assert_eq!(snap.play_pause, PlayPause::Pause);
        assert_eq!(snap.background, Color::TRANSPARENT);
        assert!(snap.use_dark_text);

        let request = change.request.unwrap();
        assert_eq!(request.album_id, 101);
        assert_eq!(request.ticket.song.id, 1);
    }

    #[test]
    fn test_stale_artwork_is_dropped() {
        let mut projector = NowPlayingProjector::new(true, true);
        let x = projector.on_queue_changed(song(1), true).request.unwrap();
        let y = projector.on_queue_changed(song(2), true).request.unwrap();

        assert_eq!(projector.on_artwork_resolved(&x.ticket, art([255, 0, 0, 255])), None);
        assert_eq!(projector.on_artwork_failed(&x.ticket), None);

        let snap = snapshot(projector.projection());
        assert_eq!(snap.song.id, 2);
        assert_eq!(snap.artwork, ArtworkState::Loading);

        let blue = art([0, 0, 255, 255]);
        let snap = snapshot(projector.on_artwork_resolved(&y.ticket, blue.clone()).unwrap());
        assert_eq!(snap.artwork, ArtworkState::Loaded(blue));
    }

    #[test]
    fn test_colored_background_and_text() {
        let mut projector = NowPlayingProjector::new(true, false);
        let req = projector.on_queue_changed(song(1), false).request.unwrap();

        let snap = snapshot(
            projector
                .on_artwork_resolved(&req.ticket, art([250, 240, 120, 255]))
                .unwrap(),
        );
        assert!(!snap.background.is_transparent());
        assert!(snap.use_dark_text);

        let snap = snapshot(projector.set_colored(false));
        assert_eq!(snap.background, Color::TRANSPARENT);
        assert!(!snap.use_dark_text);
    }

    #[test]
    fn test_uncolored_always_uses_platform_default() {
        for platform in [true, false] {
            let mut projector = NowPlayingProjector::new(false, platform);
            let req = projector.on_queue_changed(song(1), true).request.unwrap();
            for px in [[0, 0, 0, 255], [255, 255, 255, 255], [200, 20, 20, 255]] {
                let snap = snapshot(projector.on_artwork_resolved(&req.ticket, art(px)).unwrap());
                assert_eq!(snap.use_dark_text, platform);
            }
        }
    }

    #[test]
    fn test_failure_is_transparent() {
        let mut projector = NowPlayingProjector::new(true, true);
        let req = projector.on_queue_changed(song(1), true).request.unwrap();

        let snap = snapshot(projector.on_artwork_failed(&req.ticket).unwrap());
        assert_eq!(snap.artwork, ArtworkState::Failed);
        assert_eq!(snap.background, Color::TRANSPARENT);
        assert!(snap.use_dark_text);
    }

    #[test]
    fn test_playing_change_keeps_artwork() {
        let mut projector = NowPlayingProjector::new(true, true);
        let req = projector.on_queue_changed(song(1), true).request.unwrap();
        let cover = art([0, 120, 0, 255]);
        projector.on_artwork_resolved(&req.ticket, cover.clone());

        let snap = snapshot(projector.on_playing_changed(false));
        assert!(!snap.is_playing);
        assert_eq!(snap.play_pause, PlayPause::Play);
        assert_eq!(snap.artwork, ArtworkState::Loaded(cover));
    }

    #[test]
    fn test_empty_song_dismisses() {
        let mut projector = NowPlayingProjector::new(true, true);
        let req = projector.on_queue_changed(song(1), true).request.unwrap();

        let change = projector.on_queue_changed(Song::empty(), false);
        assert_eq!(change.projection, Projection::Dismiss);
        assert!(change.request.is_none());

        // late result for the old song must not bring the notification back
        assert_eq!(projector.on_artwork_resolved(&req.ticket, art([1, 2, 3, 255])), None);
        assert_eq!(projector.on_playing_changed(true), Projection::Dismiss);
    }

    #[test]
    fn test_revisions_increase() {
        let mut projector = NowPlayingProjector::new(true, true);
        let a = snapshot(projector.on_queue_changed(song(1), true).projection).revision;
        let b = snapshot(projector.on_playing_changed(false)).revision;
        let c = snapshot(projector.set_colored(false)).revision;
        assert!(a < b && b < c);
        assert_eq!(snapshot(projector.projection()).revision, c);
    }
}
