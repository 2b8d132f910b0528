//! HTTP route handlers for the slide tile API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::service::TileStore;
use super::types::{DefaultDescriptor, SlideError, TileRef};

/// Application state containing the tile store
#[derive(Clone)]
pub struct TileAppState {
    pub tile_store: Arc<dyn TileStore>,
}

/// Error response for the tile API, serialized as `{"detail": "..."}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<SlideError> for ApiError {
    fn from(e: SlideError) -> Self {
        let status = match &e {
            SlideError::TileNotFound | SlideError::ImageNotFound => StatusCode::NOT_FOUND,
            SlideError::InvalidName(_) => StatusCode::BAD_REQUEST,
            SlideError::RegionsParse(_) | SlideError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// GET /api/fastapi/dzi/:slide_name - DZI descriptor for a slide
///
/// Streams the on-disk `.dzi` file as XML when present; otherwise returns
/// the fixed default descriptor as JSON. Absence is never a 404.
pub async fn get_dzi_descriptor(
    State(state): State<TileAppState>,
    Path(slide_name): Path<String>,
) -> Result<Response, ApiError> {
    match state.tile_store.dzi_descriptor(&slide_name).await? {
        Some(bytes) => Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/xml"),
                (header::CACHE_CONTROL, "public, max-age=3600"),
            ],
            bytes,
        )
            .into_response()),
        None => {
            tracing::debug!("No descriptor on disk for {}, serving default", slide_name);
            Ok(Json(DefaultDescriptor::default()).into_response())
        }
    }
}

/// GET /api/fastapi/tiles/:slide_name/:level/:tile_name - individual tile
///
/// `tile_name` carries the `{col}_{row}.{format}` triple in one segment.
pub async fn get_tile(
    State(state): State<TileAppState>,
    Path((slide_name, level, tile_name)): Path<(String, u32, String)>,
) -> Result<Response, ApiError> {
    let (col, row, format) = parse_tile_filename(&tile_name)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid tile name: {tile_name}")))?;

    let request = TileRef {
        slide: slide_name.clone(),
        level,
        col,
        row,
        format: format.clone(),
    };

    let bytes = state.tile_store.tile(&request).await.map_err(|e| {
        match &e {
            SlideError::TileNotFound => {
                tracing::debug!(
                    "Tile not found: {} level={} col={} row={}",
                    slide_name,
                    level,
                    col,
                    row
                );
            }
            _ => {
                tracing::error!(
                    "Failed to read tile: {} level={} col={} row={}: {}",
                    slide_name,
                    level,
                    col,
                    row,
                    e
                );
            }
        }
        ApiError::from(e)
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, tile_media_type(&format)),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/fastapi/regions/:slide_name - annotated regions for a slide
///
/// Returns the on-disk JSON verbatim; a missing file yields an empty set.
pub async fn get_regions(
    State(state): State<TileAppState>,
    Path(slide_name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let regions = state.tile_store.regions(&slide_name).await.map_err(|e| {
        tracing::warn!("Failed to read regions for {}: {}", slide_name, e);
        ApiError::from(e)
    })?;

    Ok(Json(
        regions.unwrap_or_else(|| serde_json::json!({ "regions": [] })),
    ))
}

/// Response for GET /api/fastapi/images/:slide_name
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<String>,
}

/// GET /api/fastapi/images/:slide_name - list raw image files for a slide
pub async fn list_slide_images(
    State(state): State<TileAppState>,
    Path(slide_name): Path<String>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let images = state.tile_store.list_images(&slide_name).await.map_err(|e| {
        tracing::warn!("Failed to list images for {}: {}", slide_name, e);
        ApiError::from(e)
    })?;

    Ok(Json(ImagesResponse { images }))
}

/// GET /api/fastapi/image/:slide_name/:image_name - a raw image file
pub async fn get_image(
    State(state): State<TileAppState>,
    Path((slide_name, image_name)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let bytes = state
        .tile_store
        .image(&slide_name, &image_name)
        .await
        .map_err(|e| {
            if matches!(e, SlideError::ImageNotFound) {
                tracing::debug!("Image not found: {}/{}", slide_name, image_name);
            } else {
                tracing::error!("Failed to read image {}/{}: {}", slide_name, image_name, e);
            }
            ApiError::from(e)
        })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, image_media_type(&image_name))],
        bytes,
    )
        .into_response())
}

/// Build the tile API routes (nested under `/api/fastapi` by the caller)
pub fn slide_routes(state: TileAppState) -> Router {
    Router::new()
        .route("/dzi/:slide_name", get(get_dzi_descriptor))
        .route("/tiles/:slide_name/:level/:tile_name", get(get_tile))
        .route("/regions/:slide_name", get(get_regions))
        .route("/images/:slide_name", get(list_slide_images))
        .route("/image/:slide_name/:image_name", get(get_image))
        .with_state(state)
}

/// Split a `{col}_{row}.{format}` tile filename into its parts
fn parse_tile_filename(name: &str) -> Option<(u32, u32, String)> {
    let (stem, format) = name.split_once('.')?;
    let (col, row) = stem.split_once('_')?;
    if format.is_empty() {
        return None;
    }
    Some((col.parse().ok()?, row.parse().ok()?, format.to_string()))
}

/// Media type for a tile, derived from its format segment
fn tile_media_type(format: &str) -> String {
    match format {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        other => format!("image/{other}"),
    }
}

/// Media type for a named image file, from a fixed extension table
fn image_media_type(name: &str) -> &'static str {
    let ext = std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("tiff") | Some("tif") => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_filename() {
        assert_eq!(
            parse_tile_filename("3_4.jpeg"),
            Some((3, 4, "jpeg".to_string()))
        );
        assert_eq!(
            parse_tile_filename("0_0.png"),
            Some((0, 0, "png".to_string()))
        );
        assert_eq!(parse_tile_filename("3_4"), None);
        assert_eq!(parse_tile_filename("34.jpeg"), None);
        assert_eq!(parse_tile_filename("a_b.jpeg"), None);
        assert_eq!(parse_tile_filename("3_4."), None);
    }

    #[test]
    fn test_tile_media_type() {
        assert_eq!(tile_media_type("jpg"), "image/jpeg");
        assert_eq!(tile_media_type("jpeg"), "image/jpeg");
        assert_eq!(tile_media_type("png"), "image/png");
        assert_eq!(tile_media_type("webp"), "image/webp");
    }

    #[test]
    fn test_image_media_type() {
        assert_eq!(image_media_type("a.jpg"), "image/jpeg");
        assert_eq!(image_media_type("a.JPEG"), "image/jpeg");
        assert_eq!(image_media_type("a.png"), "image/png");
        assert_eq!(image_media_type("a.tif"), "image/tiff");
        assert_eq!(image_media_type("a.tiff"), "image/tiff");
        assert_eq!(image_media_type("a.bin"), "application/octet-stream");
        assert_eq!(image_media_type("noext"), "application/octet-stream");
    }
}
