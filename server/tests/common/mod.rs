//! Common Test Utilities for Integration Tests
//!
//! Shared helpers used across integration test modules.

use axum::{Json, Router, routing::get};
use serde::Serialize;
use slideserve_server::{Config, LocalTileStore, TileAppState, slide_routes};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

static FIXTURE_SEQ: AtomicUsize = AtomicUsize::new(0);

/// A unique tiles root on disk, removed when the fixture is dropped
pub struct TestTiles {
    root: PathBuf,
}

impl TestTiles {
    pub fn new() -> Self {
        let seq = FIXTURE_SEQ.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "slideserve-it-{}-{}",
            std::process::id(),
            seq
        ));
        fs::create_dir_all(&root).expect("create fixture root");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file under the tiles root, creating parent directories
    pub fn write(&self, relative: &str, contents: &[u8]) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dirs");
        }
        fs::write(&path, contents).expect("write fixture file");
    }

    /// Create an (empty) slide directory under the tiles root
    pub fn slide_dir(&self, slide: &str) {
        fs::create_dir_all(self.root.join(slide)).expect("create slide dir");
    }
}

impl Drop for TestTiles {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "tile-server",
    })
}

/// Create a test application router mirroring the production assembly
pub fn create_test_app(tiles_dir: &Path) -> Router {
    let config = Config {
        tiles_dir: tiles_dir.to_path_buf(),
        ..Config::default()
    };
    let tile_store = LocalTileStore::new(&config).expect("tile store over fixture dir");
    let state = TileAppState {
        tile_store: Arc::new(tile_store),
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let mut app = Router::new()
        .route("/health", get(health))
        .nest("/api/fastapi", slide_routes(state));

    if tiles_dir.is_dir() {
        app = app.nest_service("/tiles", ServeDir::new(tiles_dir));
    }

    app.layer(cors)
}
