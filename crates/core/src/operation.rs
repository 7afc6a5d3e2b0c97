// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations recorded in the librarian log

use crate::reservation::{ClientId, Label, Namespace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Client written for reset entries, which have no holder
pub const RESET_CLIENT: &str = "n/a";

/// Label written for reset entries
pub const RESET_LABEL: Label = Label(0);

/// Keyword identifying an operation on disk and in history responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Checkout,
    Checkin,
    Reset,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Checkout => "checkout",
            OpKind::Checkin => "checkin",
            OpKind::Reset => "reset",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation {0:?}")]
pub struct UnknownOp(pub String);

impl FromStr for OpKind {
    type Err = UnknownOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checkout" => Ok(OpKind::Checkout),
            "checkin" => Ok(OpKind::Checkin),
            "reset" => Ok(OpKind::Reset),
            other => Err(UnknownOp(other.to_string())),
        }
    }
}

/// A state-changing operation on the reservation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Reserve a label for a client
    Checkout {
        namespace: Namespace,
        label: Label,
        client: ClientId,
    },

    /// Release a label held by a client
    Checkin {
        namespace: Namespace,
        label: Label,
        client: ClientId,
    },

    /// Drop every reservation in a namespace
    Reset { namespace: Namespace },
}

impl Operation {
    pub fn checkout(
        namespace: impl Into<Namespace>,
        label: impl Into<Label>,
        client: impl Into<ClientId>,
    ) -> Self {
        Operation::Checkout {
            namespace: namespace.into(),
            label: label.into(),
            client: client.into(),
        }
    }

    pub fn checkin(
        namespace: impl Into<Namespace>,
        label: impl Into<Label>,
        client: impl Into<ClientId>,
    ) -> Self {
        Operation::Checkin {
            namespace: namespace.into(),
            label: label.into(),
            client: client.into(),
        }
    }

    pub fn reset(namespace: impl Into<Namespace>) -> Self {
        Operation::Reset {
            namespace: namespace.into(),
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Checkout { .. } => OpKind::Checkout,
            Operation::Checkin { .. } => OpKind::Checkin,
            Operation::Reset { .. } => OpKind::Reset,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        match self {
            Operation::Checkout { namespace, .. }
            | Operation::Checkin { namespace, .. }
            | Operation::Reset { namespace } => namespace,
        }
    }

    /// Label and client, if the operation targets a single reservation
    pub fn target(&self) -> Option<(Label, &ClientId)> {
        match self {
            Operation::Checkout { label, client, .. } | Operation::Checkin { label, client, .. } => {
                Some((*label, client))
            }
            Operation::Reset { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
