// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log entry line format
//!
//! One operation per line, five space-separated fields:
//!
//! ```text
//! <RFC-3339 timestamp> <namespace> <checkout|checkin|reset> <label> <client>
//! ```
//!
//! Reset entries carry placeholder label and client values.

use chrono::{DateTime, SecondsFormat, Utc};
use librarian_core::{
    ClientId, Label, Namespace, OpKind, Operation, UnknownOp, RESET_CLIENT, RESET_LABEL,
};
use std::num::ParseIntError;
use thiserror::Error;

const FIELD_COUNT: usize = 5;

/// Errors parsing a single log line
#[derive(Debug, Error)]
pub enum EntryParseError {
    #[error("expected {FIELD_COUNT} fields, found {found}")]
    FieldCount { found: usize },
    #[error("bad timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        source: chrono::ParseError,
    },
    #[error(transparent)]
    Op(#[from] UnknownOp),
    #[error("bad label {value:?}: {source}")]
    Label {
        value: String,
        source: ParseIntError,
    },
}

/// A single timestamped entry in the librarian log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
}

impl LogEntry {
    pub fn new(timestamp: DateTime<Utc>, operation: Operation) -> Self {
        Self {
            timestamp,
            operation,
        }
    }

    /// Serialize to a single log line (without trailing newline)
    pub fn to_line(&self) -> String {
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let (label, client) = match &self.operation {
            Operation::Checkout { label, client, .. } | Operation::Checkin { label, client, .. } => {
                (*label, client.as_str())
            }
            Operation::Reset { .. } => (RESET_LABEL, RESET_CLIENT),
        };
        format!(
            "{} {} {} {} {}",
            timestamp,
            self.operation.namespace(),
            self.operation.kind(),
            label,
            client
        )
    }

    /// Parse a single log line
    pub fn from_line(line: &str) -> Result<Self, EntryParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [time, namespace, op, label, client] = fields[..] else {
            return Err(EntryParseError::FieldCount {
                found: fields.len(),
            });
        };

        let timestamp = DateTime::parse_from_rfc3339(time)
            .map_err(|source| EntryParseError::Timestamp {
                value: time.to_string(),
                source,
            })?
            .with_timezone(&Utc);
        let kind: OpKind = op.parse()?;
        let label: Label = label.parse().map_err(|source| EntryParseError::Label {
            value: label.to_string(),
            source,
        })?;

        let namespace = Namespace::from(namespace);
        let operation = match kind {
            OpKind::Checkout => Operation::Checkout {
                namespace,
                label,
                client: ClientId::from(client),
            },
            OpKind::Checkin => Operation::Checkin {
                namespace,
                label,
                client: ClientId::from(client),
            },
            OpKind::Reset => Operation::Reset { namespace },
        };

        Ok(Self {
            timestamp,
            operation,
        })
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
