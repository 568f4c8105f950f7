//! Queue Controller
//!
//! Ordered play queue plus the current position. Every command is forwarded
//! to the [`PlaybackEngine`] first and applied locally only once the engine
//! accepted it, so a failed call never leaves the two views diverged.

use crate::error::{QueueError, QueueResult};
use crate::player::{PlaybackEngine, Song};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only copy of the queue; what "save as playlist" writes out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSnapshot {
    pub songs: Vec<Song>,
    pub position: Option<usize>,
    pub is_playing: bool,
}

impl QueueSnapshot {
    pub fn current_song(&self) -> Option<&Song> {
        self.position.and_then(|p| self.songs.get(p))
    }
}

/// Where `position` ends up after the song at `from` is moved to `to`.
///
/// The song under the cursor stays under the cursor: if it was the one moved
/// it follows the move, if it was crossed it shifts by one.
pub fn shifted_position(position: usize, from: usize, to: usize) -> usize {
    if position == from {
        to
    } else if from < position && position <= to {
        position - 1
    } else if to <= position && position < from {
        position + 1
    } else {
        position
    }
}

pub struct QueueController {
    engine: Arc<dyn PlaybackEngine>,
    queue: Vec<Song>,
    position: Option<usize>,
    playing: bool,
}

impl QueueController {
    /// Build the controller from the engine's current queue.
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> QueueResult<Self> {
        let mut controller = Self {
            engine,
            queue: Vec::new(),
            position: None,
            playing: false,
        };
        controller.sync()?;
        Ok(controller)
    }

    /// Reload queue, position and playing flag from the engine.
    pub fn sync(&mut self) -> QueueResult<()> {
        let queue = self.engine.playing_queue().map_err(engine_err)?;
        let position = self.engine.position().map_err(engine_err)?;
        let playing = self.engine.is_playing().map_err(engine_err)?;

        self.position = match position {
            Some(p) if p < queue.len() => Some(p),
            Some(p) => {
                warn!(position = p, len = queue.len(), "engine position out of range, resetting");
                if queue.is_empty() { None } else { Some(0) }
            }
            None if queue.is_empty() => None,
            None => Some(0),
        };
        self.playing = playing && self.position.is_some();
        self.queue = queue;
        debug!(len = self.queue.len(), position = ?self.position, "queue synced");
        Ok(())
    }

    fn check_index(&self, index: usize) -> QueueResult<()> {
        if index >= self.queue.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.queue.len(),
            });
        }
        Ok(())
    }

    /// Move the song at `from` to `to`, keeping the cursor on the same song.
    pub fn reorder(&mut self, from: usize, to: usize) -> QueueResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        self.engine.move_song(from, to).map_err(engine_err)?;

        let song = self.queue.remove(from);
        self.queue.insert(to, song);
        self.position = self.position.map(|p| shifted_position(p, from, to));
        debug!(from, to, position = ?self.position, "queue reordered");
        Ok(())
    }

    pub fn play_at(&mut self, index: usize) -> QueueResult<()> {
        self.check_index(index)?;
        self.engine.play_song_at(index).map_err(engine_err)?;
        self.position = Some(index);
        self.playing = true;
        Ok(())
    }

    /// Play the next song. Fails at the end of the queue.
    pub fn skip(&mut self) -> QueueResult<()> {
        let next = self.position.map_or(0, |p| p + 1);
        self.play_at(next)
    }

    /// Play the previous song. Fails at the start of the queue.
    pub fn rewind(&mut self) -> QueueResult<()> {
        match self.position {
            Some(p) if p > 0 => self.play_at(p - 1),
            _ => Err(QueueError::BeforeStart {
                len: self.queue.len(),
            }),
        }
    }

    pub fn set_playing(&mut self, playing: bool) -> QueueResult<()> {
        if playing && self.position.is_none() {
            return Err(QueueError::IndexOutOfRange { index: 0, len: 0 });
        }
        self.engine.set_playing(playing).map_err(engine_err)?;
        self.playing = playing;
        Ok(())
    }

    pub fn toggle_playing(&mut self) -> QueueResult<bool> {
        let playing = !self.playing;
        self.set_playing(playing)?;
        Ok(playing)
    }

    pub fn current_position(&self) -> Option<usize> {
        self.position
    }

    /// The song under the cursor, or the empty sentinel.
    pub fn current_song(&self) -> Song {
        self.position
            .and_then(|p| self.queue.get(p))
            .cloned()
            .unwrap_or_else(Song::empty)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn songs(&self) -> &[Song] {
        &self.queue
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            songs: self.queue.clone(),
            position: self.position,
            is_playing: self.playing,
        }
    }
}

fn engine_err(e: anyhow::Error) -> QueueError {
    QueueError::Engine(format!("{:#}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::LocalEngine;

    fn song(id: i64) -> Song {
        Song::new(id, &format!("Song {}", id), "Artist", "Album", 10 + id)
    }

    fn controller(n: i64, position: Option<usize>) -> QueueController {
        let engine = Arc::new(LocalEngine::new((0..n).map(song).collect(), position));
        QueueController::new(engine).unwrap()
    }

    fn ids(c: &QueueController) -> Vec<i64> {
        c.songs().iter().map(|s| s.id).collect()
    }

    struct FailingEngine;

    impl PlaybackEngine for FailingEngine {
        fn playing_queue(&self) -> anyhow::Result<Vec<Song>> {
            Ok(vec![song(0), song(1), song(2)])
        }
        fn position(&self) -> anyhow::Result<Option<usize>> {
            Ok(Some(1))
        }
        fn is_playing(&self) -> anyhow::Result<bool> {
            Ok(true)
        }
        fn play_song_at(&self, _index: usize) -> anyhow::Result<()> {
            anyhow::bail!("device unavailable")
        }
        fn set_playing(&self, _playing: bool) -> anyhow::Result<()> {
            Ok(())
        }
        fn move_song(&self, _from: usize, _to: usize) -> anyhow::Result<()> {
            anyhow::bail!("device unavailable")
        }
    }

    #[test]
    fn test_move_first_to_end_keeps_current() {
        // [A,B,C,D] playing B, move A to the end
        let mut c = controller(4, Some(1));
        c.reorder(0, 3).unwrap();

        assert_eq!(ids(&c), vec![1, 2, 3, 0]);
        assert_eq!(c.current_position(), Some(0));
        assert_eq!(c.current_song().id, 1);
    }

    #[test]
    fn test_moving_current_song_follows_it() {
        let mut c = controller(5, Some(1));
        c.reorder(1, 4).unwrap();
        assert_eq!(c.current_position(), Some(4));
        assert_eq!(c.current_song().id, 1);

        c.reorder(4, 0).unwrap();
        assert_eq!(c.current_position(), Some(0));
        assert_eq!(c.current_song().id, 1);
    }

    #[test]
    fn test_move_across_current_from_after() {
        let mut c = controller(5, Some(2));
        c.reorder(4, 0).unwrap();
        assert_eq!(ids(&c), vec![4, 0, 1, 2, 3]);
        assert_eq!(c.current_position(), Some(3));
        assert_eq!(c.current_song().id, 2);
    }

    #[test]
    fn test_move_not_crossing_current() {
        let mut c = controller(5, Some(0));
        c.reorder(2, 4).unwrap();
        assert_eq!(c.current_position(), Some(0));
        assert_eq!(c.current_song().id, 0);
    }

    #[test]
    fn test_every_move_preserves_songs_and_current() {
        for n in 1..=5usize {
            for pos in 0..n {
                for from in 0..n {
                    for to in 0..n {
                        let mut c = controller(n as i64, Some(pos));
                        let before = c.current_song();
                        c.reorder(from, to).unwrap();

                        let mut sorted = ids(&c);
                        sorted.sort();
                        assert_eq!(sorted, (0..n as i64).collect::<Vec<_>>());
                        assert_eq!(c.current_song(), before, "n={n} pos={pos} {from}->{to}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_reorder_out_of_range_is_untouched() {
        let mut c = controller(3, Some(2));
        let before = c.snapshot();

        assert_eq!(
            c.reorder(0, 3),
            Err(QueueError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            c.reorder(5, 0),
            Err(QueueError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(c.snapshot(), before);
    }

    #[test]
    fn test_empty_queue_rejects_indices() {
        let mut c = controller(0, None);
        assert_eq!(c.current_position(), None);
        assert!(c.current_song().is_empty());
        assert_eq!(
            c.play_at(0),
            Err(QueueError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert!(c.reorder(0, 0).is_err());
        assert!(c.skip().is_err());
        assert!(c.set_playing(true).is_err());
    }

    #[test]
    fn test_play_at_moves_cursor_and_plays() {
        let mut c = controller(3, Some(0));
        assert!(!c.is_playing());
        c.play_at(2).unwrap();
        assert_eq!(c.current_position(), Some(2));
        assert!(c.is_playing());

        assert!(c.play_at(3).is_err());
        assert_eq!(c.current_position(), Some(2));
    }

    #[test]
    fn test_skip_and_rewind_stop_at_ends() {
        let mut c = controller(2, Some(0));
        c.skip().unwrap();
        assert_eq!(c.current_position(), Some(1));
        assert!(c.skip().is_err());

        c.rewind().unwrap();
        assert_eq!(c.current_position(), Some(0));
        assert_eq!(c.rewind(), Err(QueueError::BeforeStart { len: 2 }));
        assert_eq!(c.current_position(), Some(0));
    }

    #[test]
    fn test_huge_index_reported_as_is() {
        let mut c = controller(2, Some(0));
        assert_eq!(
            c.play_at(usize::MAX),
            Err(QueueError::IndexOutOfRange {
                index: usize::MAX,
                len: 2
            })
        );
        assert_eq!(c.current_position(), Some(0));
    }

    #[test]
    fn test_toggle_playing() {
        let mut c = controller(1, Some(0));
        assert!(c.toggle_playing().unwrap());
        assert!(!c.toggle_playing().unwrap());
    }

    #[test]
    fn test_engine_failure_leaves_state() {
        let mut c = QueueController::new(Arc::new(FailingEngine)).unwrap();
        let before = c.snapshot();

        assert!(matches!(c.reorder(0, 2), Err(QueueError::Engine(_))));
        assert!(matches!(c.play_at(0), Err(QueueError::Engine(_))));
        assert_eq!(c.snapshot(), before);
    }

    #[test]
    fn test_snapshot_current_song() {
        let c = controller(3, Some(1));
        let snap = c.snapshot();
        assert_eq!(snap.current_song().map(|s| s.id), Some(1));
    }
}
