//! Local tile store reading pre-rendered artifacts from a directory tree

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::config::Config;

use super::service::TileStore;
use super::types::{SlideError, TileRef};

/// Image extensions listed by the images endpoint (matched as-is, not
/// case-folded, on the stored filename)
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff"];

/// Tile store backed by a local directory of pre-generated DZI pyramids
pub struct LocalTileStore {
    tiles_dir: PathBuf,
}

impl LocalTileStore {
    /// Create a new local tile store rooted at the configured tiles directory
    pub fn new(config: &Config) -> Result<Self, SlideError> {
        let tiles_dir = &config.tiles_dir;

        if !tiles_dir.is_dir() {
            return Err(SlideError::IoError(std::io::Error::new(
                ErrorKind::NotFound,
                format!("Tiles directory not found: {:?}", tiles_dir),
            )));
        }

        info!("Initialized local tile store with directory: {:?}", tiles_dir);

        Ok(Self {
            tiles_dir: tiles_dir.clone(),
        })
    }

    /// Resolve the directory for a slide, rejecting names that would escape
    /// the tiles root
    fn slide_dir(&self, slide: &str) -> Result<PathBuf, SlideError> {
        validate_name(slide)?;
        Ok(self.tiles_dir.join(slide))
    }

    /// Read a file, mapping "does not exist" to `None` instead of an error.
    ///
    /// A single read call rather than an exists-check followed by a read, so
    /// there is no window where the file can vanish between the two.
    async fn read_optional(&self, path: &std::path::Path) -> Result<Option<Bytes>, SlideError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlideError::IoError(e)),
        }
    }

    /// Try the primary `{slide}_files/{level}` layout, then the flat
    /// `{slide}/{level}` layout some tiling tools produce
    async fn resolve_tile(&self, tile: &TileRef) -> Result<Bytes, SlideError> {
        validate_name(&tile.format)?;
        let dir = self.slide_dir(&tile.slide)?;
        let tile_name = format!("{}_{}.{}", tile.col, tile.row, tile.format);

        let primary = dir
            .join(format!("{}_files", tile.slide))
            .join(tile.level.to_string())
            .join(&tile_name);

        if let Some(bytes) = self.read_optional(&primary).await? {
            return Ok(bytes);
        }

        let alternate = dir.join(tile.level.to_string()).join(&tile_name);

        self.read_optional(&alternate)
            .await?
            .ok_or(SlideError::TileNotFound)
    }
}

#[async_trait]
impl TileStore for LocalTileStore {
    async fn dzi_descriptor(&self, slide: &str) -> Result<Option<Bytes>, SlideError> {
        let path = self.slide_dir(slide)?.join(format!("{slide}.dzi"));
        self.read_optional(&path).await
    }

    async fn tile(&self, tile: &TileRef) -> Result<Bytes, SlideError> {
        let start = Instant::now();
        counter!("slideserve_tile_requests_total").increment(1);

        let result = self.resolve_tile(tile).await;

        histogram!("slideserve_tile_duration_seconds").record(start.elapsed());
        if result.is_err() {
            counter!("slideserve_tile_errors_total").increment(1);
        }

        result
    }

    async fn regions(&self, slide: &str) -> Result<Option<serde_json::Value>, SlideError> {
        let path = self.slide_dir(slide)?.join("regions.json");
        match self.read_optional(&path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_images(&self, slide: &str) -> Result<Vec<String>, SlideError> {
        let dir = self.slide_dir(slide)?;

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            // Missing slide directory is an empty listing, not an error
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SlideError::IoError(e)),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if let Some(ext) = ext
                && IMAGE_EXTENSIONS.contains(&ext)
                && let Some(name) = path.file_name().and_then(|n| n.to_str())
            {
                images.push(name.to_string());
            }
        }

        debug!("Found {} images for slide {}", images.len(), slide);
        Ok(images)
    }

    async fn image(&self, slide: &str, image: &str) -> Result<Bytes, SlideError> {
        validate_name(image)?;
        let path = self.slide_dir(slide)?.join(image);

        self.read_optional(&path)
            .await?
            .ok_or(SlideError::ImageNotFound)
    }
}

/// Reject path segments that are empty or could traverse out of the root
fn validate_name(name: &str) -> Result<(), SlideError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(SlideError::InvalidName(name.to_string()));
    }
    Ok(())
}
