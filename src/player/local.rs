use crate::player::traits::{PlaybackEngine, Song};
use anyhow::{bail, Result};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct LocalState {
    queue: Vec<Song>,
    position: Option<usize>,
    playing: bool,
}

/// In-process engine: keeps the queue in memory and "plays" by moving the cursor.
#[derive(Debug, Default)]
pub struct LocalEngine {
    state: Mutex<LocalState>,
}

impl LocalEngine {
    pub fn new(queue: Vec<Song>, position: Option<usize>) -> Self {
        let position = match position {
            Some(p) if p < queue.len() => Some(p),
            _ if queue.is_empty() => None,
            _ => Some(0),
        };
        Self {
            state: Mutex::new(LocalState {
                queue,
                position,
                playing: false,
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LocalState) -> Result<T>) -> Result<T> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("local engine state poisoned"))?;
        f(&mut state)
    }
}

impl PlaybackEngine for LocalEngine {
    fn playing_queue(&self) -> Result<Vec<Song>> {
        self.with_state(|s| Ok(s.queue.clone()))
    }

    fn position(&self) -> Result<Option<usize>> {
        self.with_state(|s| Ok(s.position))
    }

    fn is_playing(&self) -> Result<bool> {
        self.with_state(|s| Ok(s.playing))
    }

    fn play_song_at(&self, index: usize) -> Result<()> {
        self.with_state(|s| {
            if index >= s.queue.len() {
                bail!("no song at {} (queue has {})", index, s.queue.len());
            }
            s.position = Some(index);
            s.playing = true;
            Ok(())
        })
    }

    fn set_playing(&self, playing: bool) -> Result<()> {
        self.with_state(|s| {
            s.playing = playing && s.position.is_some();
            Ok(())
        })
    }

    fn move_song(&self, from: usize, to: usize) -> Result<()> {
        self.with_state(|s| {
            let len = s.queue.len();
            if from >= len || to >= len {
                bail!("cannot move {} -> {} in queue of {}", from, to, len);
            }
            let song = s.queue.remove(from);
            s.queue.insert(to, song);
            s.position = s.position.map(|p| crate::queue::shifted_position(p, from, to));
            Ok(())
        })
    }
}
