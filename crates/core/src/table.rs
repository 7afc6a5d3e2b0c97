// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation table: namespace -> label -> holding client
//!
//! The table is a pure data structure. Validation (`check_*`) and mutation
//! (`apply`) are separate so a caller can make an operation durable between
//! the two, and so replay can apply history without re-validating it.

use crate::operation::Operation;
use crate::reservation::{ClientId, Label, Namespace};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a checkout or checkin is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReserveError {
    #[error("uuid {namespace}, label {label} - already checked out by {holder}")]
    Conflict {
        namespace: Namespace,
        label: Label,
        holder: ClientId,
    },
    #[error("uuid {namespace} has no active checkout so can't checkin label {label}, client {client}")]
    NoCheckouts {
        namespace: Namespace,
        label: Label,
        client: ClientId,
    },
    #[error("uuid {namespace}, label {label} has not been checked out so can't be checked in by {client}")]
    NotCheckedOut {
        namespace: Namespace,
        label: Label,
        client: ClientId,
    },
    #[error("uuid {namespace}, label {label} is checked out by {holder}, not {client}")]
    WrongClient {
        namespace: Namespace,
        label: Label,
        holder: ClientId,
        client: ClientId,
    },
}

impl ReserveError {
    /// True for checkin refusals (as opposed to a checkout conflict)
    pub fn is_invalid_state(&self) -> bool {
        !matches!(self, ReserveError::Conflict { .. })
    }
}

/// Result of validating a checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Label is free and may be assigned
    Granted,
    /// Label is already held by the requesting client; nothing to do
    AlreadyHeld,
}

/// A single active reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub label: Label,
    pub client: ClientId,
}

/// In-memory ownership table rebuilt from the operation log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationTable {
    namespaces: BTreeMap<Namespace, BTreeMap<Label, ClientId>>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a checkout without mutating the table
    pub fn check_checkout(
        &self,
        namespace: &Namespace,
        label: Label,
        client: &ClientId,
    ) -> Result<CheckoutOutcome, ReserveError> {
        match self.get(namespace, label) {
            None => Ok(CheckoutOutcome::Granted),
            Some(holder) if holder == client => Ok(CheckoutOutcome::AlreadyHeld),
            Some(holder) => Err(ReserveError::Conflict {
                namespace: namespace.clone(),
                label,
                holder: holder.clone(),
            }),
        }
    }

    /// Validate a checkin without mutating the table
    pub fn check_checkin(
        &self,
        namespace: &Namespace,
        label: Label,
        client: &ClientId,
    ) -> Result<(), ReserveError> {
        let Some(checkouts) = self.namespaces.get(namespace) else {
            return Err(ReserveError::NoCheckouts {
                namespace: namespace.clone(),
                label,
                client: client.clone(),
            });
        };
        match checkouts.get(&label) {
            None => Err(ReserveError::NotCheckedOut {
                namespace: namespace.clone(),
                label,
                client: client.clone(),
            }),
            Some(holder) if holder != client => Err(ReserveError::WrongClient {
                namespace: namespace.clone(),
                label,
                holder: holder.clone(),
                client: client.clone(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Validate any operation. Resets always pass.
    pub fn check(&self, op: &Operation) -> Result<(), ReserveError> {
        match op {
            Operation::Checkout {
                namespace,
                label,
                client,
            } => self.check_checkout(namespace, *label, client).map(|_| ()),
            Operation::Checkin {
                namespace,
                label,
                client,
            } => self.check_checkin(namespace, *label, client),
            Operation::Reset { .. } => Ok(()),
        }
    }

    /// Apply an operation unconditionally
    ///
    /// A checkout overwrites any current holder and a checkin removes the
    /// label whoever holds it.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Checkout {
                namespace,
                label,
                client,
            } => {
                self.namespaces
                    .entry(namespace.clone())
                    .or_default()
                    .insert(*label, client.clone());
            }
            Operation::Checkin {
                namespace, label, ..
            } => {
                if let Some(checkouts) = self.namespaces.get_mut(namespace) {
                    checkouts.remove(label);
                }
            }
            Operation::Reset { namespace } => {
                self.namespaces.remove(namespace);
            }
        }
    }

    /// Client holding a label, if any
    pub fn get(&self, namespace: &Namespace, label: Label) -> Option<&ClientId> {
        self.namespaces.get(namespace)?.get(&label)
    }

    /// All reservations in a namespace, ordered by label
    pub fn get_all(&self, namespace: &Namespace) -> Vec<Reservation> {
        self.namespaces
            .get(namespace)
            .map(|checkouts| {
                checkouts
                    .iter()
                    .map(|(label, client)| Reservation {
                        label: *label,
                        client: client.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Namespaces checked out since their last reset, in sorted order
    ///
    /// A namespace whose labels were all checked in is still listed.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.namespaces.keys().cloned().collect()
    }

    /// Total number of active reservations across all namespaces
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
