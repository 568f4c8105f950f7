use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use tonearm::app::cli::Args;
use tonearm::app::config::{AppConfig, UserConfig};
use tonearm::app::inputs::{Input, HELP};
use tonearm::app::{logging, NowPlayingService, ServiceHandle, Stores};
use tonearm::artwork::{AlbumArtDirResolver, ChainResolver, ItunesResolver};
use tonearm::history::{
    HistoryPlaylist, HistoryStore, MemoryHistoryStore, MemoryPlaylistStore, PlaylistStore,
};
use tonearm::player::{LocalEngine, Song};
use tonearm::projector::NowPlayingProjector;
use tonearm::queue::QueueController;
use tonearm::ui::{run_presenter, TerminalPresenter};

fn load_queue(path: &Path) -> Result<Vec<Song>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading queue file {}", path.display()))?;
    let songs: Vec<Song> = serde_json::from_str(&content)
        .with_context(|| format!("parsing queue file {}", path.display()))?;
    Ok(songs)
}

fn build_resolver(args: &Args, config: &UserConfig) -> ChainResolver {
    let art_dir = args
        .album_art_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.album_art_dir));
    let mut resolver = ChainResolver::new().with(AlbumArtDirResolver::new(art_dir));

    if args.online_artwork || config.online_artwork {
        // Global HTTP Client (Reused)
        let client = reqwest::Client::builder()
            .user_agent(concat!("tonearm/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        resolver = resolver.with(ItunesResolver::new(client));
    }
    resolver
}

async fn apply(
    handle: &ServiceHandle,
    history: &HistoryPlaylist,
    playlists: &dyn PlaylistStore,
    input: Input,
) -> Result<()> {
    match input {
        Input::Play(index) => handle.play_at(index).await?,
        Input::Move { from, to } => handle.reorder(from, to).await?,
        Input::Next => handle.skip().await?,
        Input::Prev => handle.rewind().await?,
        Input::TogglePause => {
            handle.toggle_pause().await?;
        }
        Input::SetPlaying(playing) => handle.set_playing(playing).await?,
        Input::Colored(enabled) => handle.set_colored(enabled).await?,
        Input::ShowQueue => {
            let snapshot = handle.queue_snapshot().await?;
            if snapshot.songs.is_empty() {
                println!("(queue is empty)");
            }
            for (i, song) in snapshot.songs.iter().enumerate() {
                let marker = if Some(i) == snapshot.position { '*' } else { ' ' };
                println!("{} {:>3}  {} - {}", marker, i, song.title, song.artist_name);
            }
        }
        Input::SaveQueue(name) => {
            let saved = handle.save_queue_as(&name).await?;
            println!("added {} songs to \"{}\"", saved, name);
        }
        Input::ShowPlaylists => {
            for name in playlists.names()? {
                println!("  {} ({} songs)", name, playlists.songs(&name)?.len());
            }
        }
        Input::ShowHistory => {
            println!("{}:", history.name());
            for song in history.songs()? {
                println!("  {} - {}", song.title, song.artist_name);
            }
        }
        Input::ClearHistory => history.clear()?,
        Input::Refresh => handle.refresh().await?,
        Input::Help => println!("{}", HELP),
        Input::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();
    let args = Args::parse();

    if args.generate_config {
        println!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load();
    let _log_guard = logging::init(&AppConfig::get_log_dir(), &config.log_level)?;

    let songs = match &args.queue {
        Some(path) => load_queue(path)?,
        None => Vec::new(),
    };
    info!(songs = songs.len(), "starting");

    let engine = Arc::new(LocalEngine::new(songs, args.position));
    let controller = QueueController::new(engine)?;
    let projector = NowPlayingProjector::new(
        config.colored_notification && !args.no_color,
        config.platform_dark_text,
    );
    let resolver = Arc::new(build_resolver(&args, &config));
    let history: Arc<dyn HistoryStore> = Arc::new(MemoryHistoryStore::new(config.history_size));
    let playlist = HistoryPlaylist::new(history.clone());
    let playlists: Arc<dyn PlaylistStore> = Arc::new(MemoryPlaylistStore::new());

    let stores = Stores {
        history: Some(history),
        playlists: Some(playlists.clone()),
    };
    let (handle, service_task) = NowPlayingService::spawn(controller, projector, resolver, stores);
    let presenter_task = tokio::spawn(run_presenter(
        handle.subscribe(),
        TerminalPresenter::new(std::io::stdout()),
    ));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let input = match Input::parse(&line) {
            Ok(input) => input,
            Err(msg) => {
                eprintln!("{}", msg);
                continue;
            }
        };
        if input == Input::Quit {
            break;
        }
        if let Err(e) = apply(&handle, &playlist, playlists.as_ref(), input).await {
            eprintln!("{}", e);
        }
    }

    handle.shutdown().await?;
    service_task.await?;
    presenter_task.await?;
    info!("bye");
    Ok(())
}
