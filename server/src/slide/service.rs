//! TileStore trait definition

use async_trait::async_trait;
use bytes::Bytes;

use super::types::{SlideError, TileRef};

/// Trait for resolving pre-rendered slide artifacts to bytes.
///
/// Absence of optional artifacts (descriptor, regions) is reported as
/// `Ok(None)` so callers can substitute their fixed fallbacks; only tiles
/// and named images treat absence as an error.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Read the `.dzi` descriptor for a slide, if one exists on disk
    async fn dzi_descriptor(&self, slide: &str) -> Result<Option<Bytes>, SlideError>;

    /// Read a tile, trying the primary `{slide}_files` layout first and the
    /// flat `{slide}/{level}` layout second
    async fn tile(&self, tile: &TileRef) -> Result<Bytes, SlideError>;

    /// Read and parse `regions.json` for a slide, if one exists on disk
    async fn regions(&self, slide: &str) -> Result<Option<serde_json::Value>, SlideError>;

    /// List image files directly under the slide directory
    async fn list_images(&self, slide: &str) -> Result<Vec<String>, SlideError>;

    /// Read a named image file under the slide directory
    async fn image(&self, slide: &str, image: &str) -> Result<Bytes, SlideError>;
}
