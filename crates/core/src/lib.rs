// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! librarian-core: domain model for the librarian reservation service
//!
//! This crate provides:
//! - Identifiers for namespaces, labels, and clients
//! - The operations recorded in the librarian log
//! - The pure reservation table with checkout/checkin validation
//! - Clock and daily schedule abstractions for testable time handling

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod operation;
pub mod reservation;
pub mod schedule;
pub mod table;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use operation::{OpKind, Operation, UnknownOp, RESET_CLIENT, RESET_LABEL};
pub use reservation::{ClientId, InvalidArgument, Label, Namespace};
pub use schedule::DailySchedule;
pub use table::{CheckoutOutcome, Reservation, ReservationTable, ReserveError};
