use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A track as loaded from the media library. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default)]
    pub album_name: String,
    #[serde(default = "no_album")]
    pub album_id: i64,
    /// Modification stamp, used as the cache signature for album art.
    #[serde(default)]
    pub date_modified: i64,
}

fn no_album() -> i64 {
    -1
}

impl Song {
    /// Sentinel id carried by the "nothing queued" song.
    pub const EMPTY_ID: i64 = -1;

    pub fn new(id: i64, title: &str, artist_name: &str, album_name: &str, album_id: i64) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist_name: artist_name.to_string(),
            album_name: album_name.to_string(),
            album_id,
            date_modified: 0,
        }
    }

    pub fn empty() -> Self {
        Self {
            id: Self::EMPTY_ID,
            title: String::new(),
            artist_name: String::new(),
            album_name: String::new(),
            album_id: -1,
            date_modified: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id == Self::EMPTY_ID
    }

    pub fn same_identity(&self, other: &Song) -> bool {
        self.id == other.id
    }
}

/// The transport behind the queue view 🎵
///
/// Implementations own the actual audio. The queue controller keeps its own
/// ordered view and forwards every command here before applying it locally.
pub trait PlaybackEngine: Send + Sync {
    fn playing_queue(&self) -> Result<Vec<Song>>;

    /// Index of the current song, `None` when nothing is queued.
    fn position(&self) -> Result<Option<usize>>;

    fn is_playing(&self) -> Result<bool>;

    fn play_song_at(&self, index: usize) -> Result<()>;

    fn set_playing(&self, playing: bool) -> Result<()>;

    /// Engines without server-side queue ordering can ignore moves.
    fn move_song(&self, _from: usize, _to: usize) -> Result<()> {
        Ok(())
    }
}
