// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers for reservations: namespace, label, and client
//!
//! Namespaces and clients are caller-supplied strings. They are written to the
//! operation log as single whitespace-delimited tokens, so they must be
//! non-empty and free of whitespace. Nothing else is validated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Rejected namespace or client identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} {value:?} must not contain whitespace")]
    Whitespace { kind: &'static str, value: String },
}

fn validate_token(kind: &'static str, value: &str) -> Result<(), InvalidArgument> {
    if value.is_empty() {
        return Err(InvalidArgument::Empty { kind });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(InvalidArgument::Whitespace {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Namespace (usually a UUID) scoping a set of label reservations
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub String);

impl Namespace {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate a caller-supplied namespace
    pub fn parse(value: &str) -> Result<Self, InvalidArgument> {
        validate_token("namespace", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Resource reserved within a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub u64);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Label {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Label {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Label)
    }
}

/// Identity of a reservation holder (e.g. a user name)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Validate a caller-supplied client id
    pub fn parse(value: &str) -> Result<Self, InvalidArgument> {
        validate_token("client", value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
#[path = "reservation_tests.rs"]
mod tests;
