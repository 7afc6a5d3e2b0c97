// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkout, checkin, reset and reservation queries

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use librarian_core::{CheckoutOutcome, ClientId, Label, Namespace, Reservation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiError, AppState, Rejection};

/// Wire form of a single reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReservationJson {
    pub label: Label,
    pub client: ClientId,
}

impl From<Reservation> for ReservationJson {
    fn from(reservation: Reservation) -> Self {
        Self {
            label: reservation.label,
            client: reservation.client,
        }
    }
}

fn parse_label(value: &str) -> Result<Label, ApiError> {
    value.parse().map_err(|source| ApiError::BadLabel {
        value: value.to_string(),
        source,
    })
}

/// `GET /uuids`
///
/// Lists namespaces currently in the table. A namespace stays listed after
/// its last checkin but is dropped by a reset, even though its history
/// remains in the log.
pub async fn list_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<Vec<Namespace>>, Rejection> {
    let namespaces = state
        .blocking(|library| Ok(library.list_namespaces()))
        .await
        .map_err(|e| e.at(&uri))?;
    Ok(Json(namespaces))
}

/// `GET /state/{uuid}` and `GET /checkout/{uuid}`
pub async fn state_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    uri: Uri,
) -> Result<Json<Vec<ReservationJson>>, Rejection> {
    let namespace = Namespace::new(uuid);
    let reservations = state
        .blocking(move |library| Ok(library.get_all(&namespace)))
        .await
        .map_err(|e| e.at(&uri))?;
    Ok(Json(reservations.into_iter().map(ReservationJson::from).collect()))
}

/// `GET /checkout/{uuid}/{label}`
pub async fn holder_handler(
    State(state): State<AppState>,
    Path((uuid, label)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<ReservationJson>, Rejection> {
    let label = parse_label(&label).map_err(|e| e.at(&uri))?;
    let namespace = Namespace::new(uuid);
    state
        .blocking(move |library| match library.get_one(&namespace, label) {
            Some(client) => Ok(ReservationJson { label, client }),
            None => Err(ApiError::NotCheckedOut { namespace, label }),
        })
        .await
        .map(Json)
        .map_err(|e| e.at(&uri))
}

/// `PUT /checkout/{uuid}/{label}/{client}`
pub async fn checkout_handler(
    State(state): State<AppState>,
    Path((uuid, label, client)): Path<(String, String, String)>,
    uri: Uri,
) -> Result<StatusCode, Rejection> {
    let label = parse_label(&label).map_err(|e| e.at(&uri))?;
    checkout(&state, Namespace::new(uuid), label, ClientId::new(client))
        .await
        .map_err(|e| e.at(&uri))
}

/// `PUT /checkout/{uuid}` with a `{"Label": .., "Client": ..}` body
pub async fn checkout_json_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, Rejection> {
    let request: ReservationJson =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadBody(e.to_string()).at(&uri))?;
    checkout(&state, Namespace::new(uuid), request.label, request.client)
        .await
        .map_err(|e| e.at(&uri))
}

async fn checkout(
    state: &AppState,
    namespace: Namespace,
    label: Label,
    client: ClientId,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .blocking(move |library| {
            library
                .checkout(&namespace, label, &client)
                .map_err(ApiError::Checkout)
        })
        .await?;
    if outcome == CheckoutOutcome::AlreadyHeld {
        debug!("checkout repeated by current holder");
    }
    Ok(StatusCode::OK)
}

/// `PUT /checkin/{uuid}/{label}/{client}`
pub async fn checkin_handler(
    State(state): State<AppState>,
    Path((uuid, label, client)): Path<(String, String, String)>,
    uri: Uri,
) -> Result<StatusCode, Rejection> {
    let label = parse_label(&label).map_err(|e| e.at(&uri))?;
    let namespace = Namespace::new(uuid);
    let client = ClientId::new(client);
    state
        .blocking(move |library| {
            library
                .checkin(&namespace, label, &client)
                .map_err(ApiError::Checkin)
        })
        .await
        .map_err(|e| e.at(&uri))?;
    Ok(StatusCode::OK)
}

/// `PUT /reset/{uuid}`
pub async fn reset_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    uri: Uri,
) -> Result<StatusCode, Rejection> {
    let namespace = Namespace::new(uuid);
    state
        .blocking(move |library| {
            library
                .reset(&namespace)
                .map_err(|source| ApiError::Reset { namespace, source })
        })
        .await
        .map_err(|e| e.at(&uri))?;
    Ok(StatusCode::OK)
}
