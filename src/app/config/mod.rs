use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub mod user;

pub use user::UserConfig;

pub struct AppConfig;

impl AppConfig {
    pub fn get_config_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let xdg_dir = home.join(".config").join("tonearm");

        // Ensure it exists
        if !xdg_dir.exists() {
            let _ = fs::create_dir_all(&xdg_dir);
        }

        xdg_dir
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_log_dir() -> PathBuf {
        Self::get_config_dir().join("logs")
    }

    pub fn load() -> UserConfig {
        Self::load_from(&Self::get_config_path())
    }

    /// Read `path`, writing the defaults there if it does not exist yet.
    /// An unreadable or invalid file falls back to the defaults.
    pub fn load_from(path: &Path) -> UserConfig {
        if !path.exists() {
            let config = UserConfig::default();
            if let Ok(content) = toml::to_string_pretty(&config) {
                if let Some(parent) = path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                let _ = fs::write(path, content);
            }
            return config;
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "invalid config, using defaults: {}", e);
                UserConfig::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), "cannot read config, using defaults: {}", e);
                UserConfig::default()
            }
        }
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&UserConfig::default()).unwrap_or_default()
    }
}
