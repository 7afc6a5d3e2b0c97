// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP server for the librarian.
//!
//! # Endpoints
//!
//! - `GET /` - Help page
//! - `GET /uuids` - Namespaces with checkouts
//! - `GET /state/{uuid}` (also `GET /checkout/{uuid}`) - All reservations in a namespace
//! - `GET /history/{uuid}` - Logged operations for a namespace
//! - `GET /checkout/{uuid}/{label}` - Holder of one label
//! - `PUT /checkout/{uuid}/{label}/{client}` (also `PUT /checkout/{uuid}` with JSON) - Checkout
//! - `PUT /checkin/{uuid}/{label}/{client}` - Checkin
//! - `PUT /reset/{uuid}` - Drop all reservations in a namespace

use std::sync::Arc;

use axum::http::{Method, StatusCode, Uri};
use axum::routing::{get, put};
use axum::Router;
use librarian_storage::Library;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod help;
pub mod history;
pub mod reservations;

pub use error::{ApiError, Rejection};

/// Shared application state.
///
/// Passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    library: Arc<Library>,
    /// Shown on the help page
    address: String,
}

impl AppState {
    pub fn new(library: Arc<Library>, address: impl Into<String>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                library,
                address: address.into(),
            }),
        }
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.inner.library
    }

    pub fn address(&self) -> &str {
        &self.inner.address
    }

    /// Run a library call on the blocking pool
    ///
    /// Every call takes the library's std `RwLock`, which a writer holds across
    /// an fsync, so none of them run on the async workers.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Library) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let library = Arc::clone(&self.inner.library);
        Ok(tokio::task::spawn_blocking(move || f(&library)).await??)
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any);

    Router::new()
        .route("/", get(help::help_handler))
        .route("/uuids", get(reservations::list_handler))
        .route("/state/{uuid}", get(reservations::state_handler))
        .route("/history/{uuid}", get(history::history_handler))
        .route(
            "/checkout/{uuid}",
            get(reservations::state_handler).put(reservations::checkout_json_handler),
        )
        .route("/checkout/{uuid}/{label}", get(reservations::holder_handler))
        .route(
            "/checkout/{uuid}/{label}/{client}",
            put(reservations::checkout_handler),
        )
        .route(
            "/checkin/{uuid}/{label}/{client}",
            put(reservations::checkin_handler),
        )
        .route("/reset/{uuid}", put(reservations::reset_handler))
        .fallback(not_found)
        .layer(CatchPanicLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn not_found(uri: Uri) -> (StatusCode, String) {
    let message = format!("Could not find the URL: {}", uri.path());
    info!("{}", message);
    (StatusCode::NOT_FOUND, message)
}

#[cfg(test)]
#[path = "server/router_tests.rs"]
mod tests;
