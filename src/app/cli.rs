use clap::Parser;
use std::path::PathBuf;

/// tonearm - playing queue and now-playing notification driver 🎵
///
/// Reads commands from stdin (`help` lists them) and prints the notification
/// as it changes.
#[derive(Parser, Debug)]
#[command(name = "tonearm", version, about)]
pub struct Args {
    /// JSON file with the queue (array of songs)
    #[arg(long, short = 'q')]
    pub queue: Option<PathBuf>,

    /// Start position in the queue
    #[arg(long, short = 'p')]
    pub position: Option<usize>,

    /// Do not tint the notification with the album's accent color
    #[arg(long)]
    pub no_color: bool,

    /// Look up missing covers on iTunes
    #[arg(long)]
    pub online_artwork: bool,

    /// Directory of `<album_id>.jpg|png` covers (overrides config)
    #[arg(long)]
    pub album_art_dir: Option<PathBuf>,

    /// Generate default config.toml to stdout
    #[arg(long)]
    pub generate_config: bool,
}
