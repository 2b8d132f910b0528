//! Slide-related types and error definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// XML namespace used by Deep Zoom descriptors
pub const DZI_XMLNS: &str = "http://schemas.microsoft.com/deepzoom/2008";

/// Errors that can occur when resolving slide artifacts
#[derive(Debug, Error)]
pub enum SlideError {
    #[error("Tile not found")]
    TileNotFound,

    #[error("Image not found")]
    ImageNotFound,

    #[error("Invalid slide or file name: {0}")]
    InvalidName(String),

    #[error("Failed to parse regions file: {0}")]
    RegionsParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Request for a specific pre-rendered tile
#[derive(Debug, Clone)]
pub struct TileRef {
    /// Slide identifier (directory name under the tiles root)
    pub slide: String,
    /// DZI pyramid level
    pub level: u32,
    /// Tile column
    pub col: u32,
    /// Tile row
    pub row: u32,
    /// Tile file extension (jpeg, png, ...)
    pub format: String,
}

/// Synthetic DZI descriptor returned when a slide has no `.dzi` file on disk.
///
/// Mirrors the JSON shape of a parsed descriptor. The values are fixed
/// placeholders, not derived from any real image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultDescriptor {
    #[serde(rename = "Image")]
    pub image: DescriptorImage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorImage {
    pub xmlns: String,
    #[serde(rename = "Format")]
    pub format: String,
    #[serde(rename = "Overlap")]
    pub overlap: String,
    #[serde(rename = "TileSize")]
    pub tile_size: String,
    #[serde(rename = "Size")]
    pub size: DescriptorSize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorSize {
    #[serde(rename = "Width")]
    pub width: String,
    #[serde(rename = "Height")]
    pub height: String,
}

impl Default for DefaultDescriptor {
    fn default() -> Self {
        Self {
            image: DescriptorImage {
                xmlns: DZI_XMLNS.to_string(),
                format: "jpeg".to_string(),
                overlap: "1".to_string(),
                tile_size: "254".to_string(),
                size: DescriptorSize {
                    width: "10000".to_string(),
                    height: "10000".to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_descriptor_shape() {
        let json = serde_json::to_value(DefaultDescriptor::default()).unwrap();
        assert_eq!(json["Image"]["Format"], "jpeg");
        assert_eq!(json["Image"]["Overlap"], "1");
        assert_eq!(json["Image"]["TileSize"], "254");
        assert_eq!(json["Image"]["Size"]["Width"], "10000");
        assert_eq!(json["Image"]["Size"]["Height"], "10000");
        assert_eq!(json["Image"]["xmlns"], DZI_XMLNS);
    }
}
