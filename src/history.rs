//! The "History" smart playlist and user playlists.
//!
//! Both live in external stores; this module only defines the seams plus
//! in-memory stores.

use crate::player::Song;
use anyhow::{bail, Result};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

pub trait HistoryStore: Send + Sync {
    /// Most recently played first.
    fn recently_played(&self) -> Result<Vec<Song>>;
    fn record(&self, song: &Song) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct HistoryPlaylist {
    name: String,
    store: Arc<dyn HistoryStore>,
}

impl HistoryPlaylist {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self {
            name: "History".to_string(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn songs(&self) -> Result<Vec<Song>> {
        self.store.recently_played()
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

/// Keeps the last `capacity` distinct songs; replaying moves a song to the front.
pub struct MemoryHistoryStore {
    capacity: usize,
    entries: Mutex<VecDeque<Song>>,
}

impl MemoryHistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, VecDeque<Song>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("history store poisoned"))
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn recently_played(&self) -> Result<Vec<Song>> {
        Ok(self.entries()?.iter().cloned().collect())
    }

    fn record(&self, song: &Song) -> Result<()> {
        if song.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries()?;
        entries.retain(|s| !s.same_identity(song));
        entries.push_front(song.clone());
        entries.truncate(self.capacity);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries()?.clear();
        Ok(())
    }
}

/// Named user playlists, e.g. the target of "save queue as playlist".
pub trait PlaylistStore: Send + Sync {
    /// Append `songs` to the playlist `name`, creating it if needed.
    fn add_songs(&self, name: &str, songs: &[Song]) -> Result<()>;
    fn songs(&self, name: &str) -> Result<Vec<Song>>;
    fn names(&self) -> Result<Vec<String>>;
}

#[derive(Default)]
pub struct MemoryPlaylistStore {
    playlists: Mutex<BTreeMap<String, Vec<Song>>>,
}

impl MemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn playlists(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<Song>>>> {
        self.playlists
            .lock()
            .map_err(|_| anyhow::anyhow!("playlist store poisoned"))
    }
}

impl PlaylistStore for MemoryPlaylistStore {
    fn add_songs(&self, name: &str, songs: &[Song]) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            bail!("playlist name is empty");
        }
        self.playlists()?
            .entry(name.to_string())
            .or_default()
            .extend(songs.iter().filter(|s| !s.is_empty()).cloned());
        Ok(())
    }

    fn songs(&self, name: &str) -> Result<Vec<Song>> {
        match self.playlists()?.get(name.trim()) {
            Some(songs) => Ok(songs.clone()),
            None => bail!("no playlist named `{}`", name.trim()),
        }
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.playlists()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: i64) -> Song {
        Song::new(id, &format!("Song {}", id), "Artist", "Album", 1)
    }

    #[test]
    fn test_recent_first_and_deduplicated() {
        let store = MemoryHistoryStore::new(10);
        for id in [1, 2, 3, 1] {
            store.record(&song(id)).unwrap();
        }
        let ids: Vec<i64> = store.recently_played().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_capacity_and_sentinel() {
        let store = MemoryHistoryStore::new(2);
        store.record(&Song::empty()).unwrap();
        for id in 1..=3 {
            store.record(&song(id)).unwrap();
        }
        let ids: Vec<i64> = store.recently_played().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_playlist_clear() {
        let store = Arc::new(MemoryHistoryStore::new(5));
        store.record(&song(9)).unwrap();

        let playlist = HistoryPlaylist::new(store.clone());
        assert_eq!(playlist.name(), "History");
        assert_eq!(playlist.songs().unwrap().len(), 1);

        playlist.clear().unwrap();
        assert!(playlist.songs().unwrap().is_empty());
        assert!(store.recently_played().unwrap().is_empty());
    }

    #[test]
    fn test_playlist_add_appends_and_creates() {
        let store = MemoryPlaylistStore::new();
        store.add_songs("Road Trip", &[song(1), song(2)]).unwrap();
        store.add_songs(" Road Trip ", &[song(3), Song::empty()]).unwrap();
        store.add_songs("Empty", &[]).unwrap();

        let ids: Vec<i64> = store.songs("Road Trip").unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.names().unwrap(), vec!["Empty", "Road Trip"]);
        assert!(store.songs("Empty").unwrap().is_empty());
    }

    #[test]
    fn test_playlist_rejects_blank_name_and_unknown() {
        let store = MemoryPlaylistStore::new();
        assert!(store.add_songs("  ", &[song(1)]).is_err());
        assert!(store.songs("nope").is_err());
        assert!(store.names().unwrap().is_empty());
    }
}
