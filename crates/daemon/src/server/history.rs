// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-namespace operation history

use axum::extract::{Path, State};
use axum::http::Uri;
use axum::Json;
use chrono::SecondsFormat;
use librarian_core::{ClientId, Label, Namespace, OpKind};
use librarian_storage::LogEntry;
use serde::Serialize;

use super::{ApiError, AppState, Rejection};

/// Wire form of one logged operation
///
/// Resets carry neither label nor client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryJson {
    pub time: String,
    pub op: OpKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientId>,
}

impl From<&LogEntry> for HistoryJson {
    fn from(entry: &LogEntry) -> Self {
        let target = entry.operation.target();
        Self {
            time: entry.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            op: entry.operation.kind(),
            label: target.map(|(label, _)| label),
            client: target.map(|(_, client)| client.clone()),
        }
    }
}

/// `GET /history/{uuid}`
pub async fn history_handler(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
    uri: Uri,
) -> Result<Json<Vec<HistoryJson>>, Rejection> {
    let namespace = Namespace::new(uuid);
    let entries = state
        .blocking(move |library| library.history(&namespace).map_err(ApiError::from))
        .await
        .map_err(|e| e.at(&uri))?;
    Ok(Json(entries.iter().map(HistoryJson::from).collect()))
}
