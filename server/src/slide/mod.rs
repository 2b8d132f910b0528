//! Slide module for serving pre-rendered DZI artifacts
//!
//! This module provides:
//! - `TileStore` trait for abstracting the artifact source
//! - `LocalTileStore` for resolving artifacts on the local filesystem
//! - HTTP routes for descriptors, tiles, regions, and raw images

mod local;
pub mod routes;
mod service;
mod types;

pub use local::LocalTileStore;
pub use routes::{TileAppState, slide_routes};
pub use service::TileStore;
pub use types::{DefaultDescriptor, SlideError, TileRef};
