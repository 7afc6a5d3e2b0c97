// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error responses for the HTTP layer

use std::num::ParseIntError;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use librarian_core::{Label, Namespace};
use librarian_storage::LibraryError;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

/// Failures a handler can report to a client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not do checkout: {0}")]
    Checkout(#[source] LibraryError),

    #[error("unable to checkin: {0}")]
    Checkin(#[source] LibraryError),

    #[error("unable to reset uuid {namespace}: {source}")]
    Reset {
        namespace: Namespace,
        source: LibraryError,
    },

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("label {value:?} cannot be parsed as 64-bit unsigned integer: {source}")]
    BadLabel {
        value: String,
        source: ParseIntError,
    },

    #[error("no checkout for uuid {namespace}, label {label} exists")]
    NotCheckedOut { namespace: Namespace, label: Label },

    #[error("bad checkout JSON: {0}")]
    BadBody(String),

    #[error("background task failed: {0}")]
    Join(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Checkout(e)
            | ApiError::Checkin(e)
            | ApiError::Reset { source: e, .. }
            | ApiError::Library(e) => library_status(e),
            ApiError::BadLabel { .. } | ApiError::NotCheckedOut { .. } | ApiError::BadBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the request path for the response body
    pub fn at(self, uri: &Uri) -> Rejection {
        Rejection {
            error: self,
            path: uri.path().to_string(),
        }
    }
}

fn library_status(err: &LibraryError) -> StatusCode {
    match err {
        LibraryError::Conflict(_) => StatusCode::CONFLICT,
        LibraryError::InvalidState(_) | LibraryError::InvalidArgument(_) => {
            StatusCode::BAD_REQUEST
        }
        LibraryError::MalformedHistory { .. } | LibraryError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// An [`ApiError`] bound to the path of the request that caused it
#[derive(Debug)]
pub struct Rejection {
    pub error: ApiError,
    pub path: String,
}

impl Rejection {
    pub fn message(&self) -> String {
        format!("{} ({}).", self.error, self.path)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let message = self.message();
        error!("{}", message);
        (self.error.status(), message).into_response()
    }
}
