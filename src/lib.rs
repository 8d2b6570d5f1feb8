//! Notification fan-out and attachment storage core for a ticket tracker.
//!
//! `ticketry` implements the two parts of a ticket-management system whose
//! failure semantics actually matter:
//!
//! - **Notification fan-out**: given a ticket's operator-assignment
//!   transition, deterministically compute which notification messages are
//!   created and which users receive which message
//!   ([`notify::transition`], [`notify::fanout`]), then persist the result
//!   as notification + recipient-link rows ([`notify::dispatch`]).
//! - **Attachment storage**: keep a byte blob under a media root and its
//!   metadata row in lock-step without a real two-phase commit
//!   ([`attachment`]), bounding inconsistency to "orphan file, no orphan
//!   row".
//!
//! Persistence is `SQLite` via `rusqlite` ([`storage`]); the enclosing
//! ticket-edit handler is [`storage::SqliteStore::set_operator`], which
//! composes classify → fan-out → dispatch inside one transaction.
//!
//! The engine itself is pure: [`notify::fanout::fan_out`] performs no I/O
//! beyond the injected [`notify::fanout::RosterLookup`] capability, and is
//! safe under unlimited concurrent calls.

pub mod attachment;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notify;
pub mod storage;

pub use error::{Result, TicketryError};
