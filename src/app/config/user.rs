use serde::{Deserialize, Serialize};

/// User-editable configuration (ReadOnly by App after load)
/// stored in `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Tint the notification with the album art's accent color
    #[serde(default = "default_true")]
    pub colored_notification: bool,
    /// Text shade used on an untinted notification
    #[serde(default = "default_true")]
    pub platform_dark_text: bool,
    /// Directory of `<album_id>.jpg|png` covers
    #[serde(default = "default_album_art_dir")]
    pub album_art_dir: String,
    /// Fall back to the iTunes catalog when no local cover exists
    #[serde(default)]
    pub online_artwork: bool,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_album_art_dir() -> String {
    let cache = dirs::cache_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/tonearm/albumart", cache)
}

fn default_history_size() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            colored_notification: true,
            platform_dark_text: true,
            album_art_dir: default_album_art_dir(),
            online_artwork: false,
            history_size: default_history_size(),
            log_level: default_log_level(),
        }
    }
}
