//! Slideserve Server Library
//!
//! This module exports the server components for use in integration tests
//! and external tooling.

pub mod config;
pub mod slide;

// Re-export commonly used types
pub use config::Config;
pub use slide::{
    DefaultDescriptor, LocalTileStore, SlideError, TileAppState, TileRef, TileStore, slide_routes,
};
