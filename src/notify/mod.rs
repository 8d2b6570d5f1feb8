//! Notification fan-out for operator-assignment transitions.
//!
//! Three stages, in dependency order:
//! - [`transition`] classifies an (old, new) operator pair into a
//!   transition kind. Pure.
//! - [`fanout`] turns a transition plus ticket/editor context into
//!   notification intents: (message, responsible user, recipient set)
//!   triples. Pure apart from the injected roster capability.
//! - [`dispatch`] persists each intent as one notification row plus one
//!   recipient-link row per distinct recipient.
//!
//! Recipient sets are deduplicated per intent, never across intents: one
//! human can legitimately receive two links from a single assignment
//! event (creator == new operator, or old == new operator).

pub mod dispatch;
pub mod fanout;
pub mod transition;

pub use self::dispatch::dispatch;
pub use self::fanout::{NotificationIntent, RosterLookup, fan_out};
pub use self::transition::{OperatorTransition, classify};
