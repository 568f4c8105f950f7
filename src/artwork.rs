//! Album art resolution.
//!
//! Resolvers return `'static` futures so the service can run them on their
//! own task while it keeps serving commands.

pub mod palette;

use crate::error::ArtworkError;
use crate::player::Song;
use crate::theme::Color;
use futures::future::{BoxFuture, FutureExt};
use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolved cover plus the accent derived from it.
#[derive(Clone)]
pub struct Artwork {
    pub image: Arc<DynamicImage>,
    /// `Color::TRANSPARENT` when no accent could be derived.
    pub accent: Color,
}

impl Artwork {
    pub fn from_image(image: DynamicImage) -> Self {
        let accent = palette::accent_color(&image).unwrap_or(Color::TRANSPARENT);
        Self {
            image: Arc::new(image),
            accent,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ArtworkError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img))
    }
}

impl PartialEq for Artwork {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image) && self.accent == other.accent
    }
}

impl fmt::Debug for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artwork")
            .field("size", &(self.image.width(), self.image.height()))
            .field("accent", &self.accent)
            .finish()
    }
}

/// Names the song an artwork request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkTicket {
    pub song: Song,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct ArtworkRequest {
    pub ticket: ArtworkTicket,
    pub album_id: i64,
    pub artist: String,
    pub album: String,
    /// Cache signature; changes when the song file is modified.
    pub signature: i64,
}

impl ArtworkRequest {
    pub fn for_song(song: &Song, generation: u64) -> Self {
        Self {
            ticket: ArtworkTicket {
                song: song.clone(),
                generation,
            },
            album_id: song.album_id,
            artist: song.artist_name.clone(),
            album: song.album_name.clone(),
            signature: song.date_modified,
        }
    }
}

pub trait ArtworkResolver: Send + Sync {
    fn resolve(&self, request: &ArtworkRequest) -> BoxFuture<'static, Result<Artwork, ArtworkError>>;
}

async fn decode_off_runtime(bytes: Vec<u8>) -> Result<Artwork, ArtworkError> {
    tokio::task::spawn_blocking(move || Artwork::decode(&bytes))
        .await
        .map_err(|e| ArtworkError::Io(std::io::Error::other(e)))?
}

/// Looks up `<dir>/<album_id>.<ext>`, the on-disk album art cache.
pub struct AlbumArtDirResolver {
    dir: PathBuf,
}

impl AlbumArtDirResolver {
    const EXTENSIONS: [&'static str; 4] = ["jpg", "jpeg", "png", "webp"];

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtworkResolver for AlbumArtDirResolver {
    fn resolve(&self, request: &ArtworkRequest) -> BoxFuture<'static, Result<Artwork, ArtworkError>> {
        let dir = self.dir.clone();
        let album_id = request.album_id;

        async move {
            if album_id < 0 {
                return Err(ArtworkError::NotFound("song has no album".to_string()));
            }
            for ext in Self::EXTENSIONS {
                let path = dir.join(format!("{}.{}", album_id, ext));
                match tokio::fs::read(&path).await {
                    Ok(bytes) => {
                        debug!(path = %path.display(), "album art found");
                        return decode_off_runtime(bytes).await;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            Err(ArtworkError::NotFound(format!(
                "album {} in {}",
                album_id,
                dir.display()
            )))
        }
        .boxed()
    }
}

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    results: Vec<ItunesResult>,
}

#[derive(Debug, Deserialize)]
struct ItunesResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url: String,
    #[serde(rename = "collectionName")]
    collection_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
}

/// Online fallback: iTunes catalog search by artist and album name.
#[derive(Clone)]
pub struct ItunesResolver {
    client: Client,
    endpoint: String,
}

impl ItunesResolver {
    const SEARCH_URL: &'static str = "https://itunes.apple.com/search";

    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, Self::SEARCH_URL)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn clean_string(s: &str) -> String {
        // Remove content in (), [], and "feat."
        let s = s.to_lowercase();
        let s = s.split('(').next().unwrap_or("");
        let s = s.split('[').next().unwrap_or("");
        let s = s.split("feat").next().unwrap_or("");
        s.trim().to_string()
    }

    fn best_match<'a>(results: &'a [ItunesResult], artist: &str, album: &str) -> Option<&'a ItunesResult> {
        let candidates: Vec<&ItunesResult> = results
            .iter()
            .filter(|r| match &r.artist_name {
                Some(r_artist) => {
                    let r_clean = Self::clean_string(r_artist);
                    r_clean.contains(artist) || artist.contains(&r_clean)
                }
                None => true,
            })
            .collect();

        candidates
            .iter()
            .find(|r| {
                r.collection_name.as_ref().is_some_and(|name| {
                    let r_clean = Self::clean_string(name);
                    r_clean.contains(album) || album.contains(&r_clean)
                })
            })
            .or(candidates.first())
            .copied()
    }

    async fn search(
        client: &Client,
        endpoint: &str,
        artist: &str,
        album: &str,
    ) -> Result<String, ArtworkError> {
        let clean_artist = Self::clean_string(artist);
        let clean_album = Self::clean_string(album);
        let term = format!("{} {}", clean_artist, clean_album);

        // US first, then IN for regional catalogs
        for country in ["US", "IN"] {
            let params = [
                ("term", term.as_str()),
                ("entity", "album"),
                ("limit", "5"),
                ("country", country),
            ];
            let response = client
                .get(endpoint)
                .query(&params)
                .send()
                .await
                .and_then(|r| r.error_for_status());
            let data: ItunesResponse = match response {
                Ok(r) => match r.json().await {
                    Ok(data) => data,
                    Err(e) => {
                        debug!(country, "iTunes response unreadable: {}", e);
                        continue;
                    }
                },
                Err(e) => {
                    debug!(country, "iTunes search failed: {}", e);
                    continue;
                }
            };

            if let Some(result) = Self::best_match(&data.results, &clean_artist, &clean_album) {
                return Ok(result.artwork_url.replace("100x100bb", "600x600bb"));
            }
        }
        Err(ArtworkError::NotFound(format!("no iTunes match for {}", term)))
    }
}

impl ArtworkResolver for ItunesResolver {
    fn resolve(&self, request: &ArtworkRequest) -> BoxFuture<'static, Result<Artwork, ArtworkError>> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let (artist, album) = (request.artist.clone(), request.album.clone());

        async move {
            if artist.trim().is_empty() || album.trim().is_empty() {
                return Err(ArtworkError::NotFound("missing artist or album".to_string()));
            }
            let url = Self::search(&client, &endpoint, &artist, &album).await?;
            let bytes = client.get(&url).send().await?.error_for_status()?.bytes().await?;
            decode_off_runtime(bytes.to_vec()).await
        }
        .boxed()
    }
}

/// Tries each resolver in order; the first success wins.
#[derive(Default, Clone)]
pub struct ChainResolver {
    resolvers: Vec<Arc<dyn ArtworkResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl ArtworkResolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }
}

impl ArtworkResolver for ChainResolver {
    fn resolve(&self, request: &ArtworkRequest) -> BoxFuture<'static, Result<Artwork, ArtworkError>> {
        let resolvers = self.resolvers.clone();
        let request = request.clone();

        async move {
            for resolver in resolvers {
                match resolver.resolve(&request).await {
                    Ok(artwork) => return Ok(artwork),
                    Err(e) => debug!(album_id = request.album_id, "resolver miss: {}", e),
                }
            }
            Err(ArtworkError::NotFound(format!(
                "no artwork for album {}",
                request.album_id
            )))
        }
        .boxed()
    }
}
