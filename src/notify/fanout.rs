//! The notification fan-out engine.
//!
//! Consumes a ticket's operator transition plus editor context and
//! produces notification intents. No I/O of its own: the roster is an
//! injected capability, consulted only for unassignment transitions.

use crate::error::Result;
use crate::model::{NotificationMessage, Ticket, User};
use crate::notify::transition::{OperatorTransition, classify};
use std::collections::HashSet;
use tracing::debug;

/// Capability for resolving "everyone who should hear about an
/// unassignment": all users whose role is Operator or Admin.
pub trait RosterLookup {
    /// Return all users with role Operator or Admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster lookup fails.
    fn operators_and_admins(&self) -> Result<Vec<User>>;
}

/// An in-memory description of one notification to create plus its
/// recipient set, prior to persistence.
///
/// `recipients` is deduplicated, preserving first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub ticket_id: String,
    pub message: NotificationMessage,
    /// User who triggered the notification.
    pub responsible_id: String,
    pub recipients: Vec<String>,
}

/// Compute the notification intents for one operator-assignment edit.
///
/// `ticket` carries the post-edit state: `ticket.operator_id` is the new
/// operator. `old_operator` is the pre-edit value; a present-but-empty
/// identifier is still treated as present and is included verbatim in
/// recipient sets. The engine never checks that an identifier resolves to
/// a real user.
///
/// The roster is consulted only for unassignment transitions.
///
/// # Errors
///
/// Returns an error only if the roster lookup fails.
pub fn fan_out(
    ticket: &Ticket,
    old_operator: Option<&str>,
    editor: &str,
    roster: &impl RosterLookup,
) -> Result<Vec<NotificationIntent>> {
    let new_operator = ticket.operator_id.as_deref();
    let kind = classify(old_operator, new_operator);
    debug!(
        ticket = %ticket.id,
        transition = %kind,
        "classified operator transition"
    );

    match kind {
        OperatorTransition::NoOp => Ok(Vec::new()),
        OperatorTransition::Unassigned => {
            let mut recipients = vec![ticket.creator_id.clone()];
            recipients.extend(roster.operators_and_admins()?.into_iter().map(|u| u.id));
            Ok(vec![NotificationIntent {
                ticket_id: ticket.id.clone(),
                message: NotificationMessage::TicketUnassigned,
                responsible_id: editor.to_string(),
                recipients: dedup_preserving_order(recipients),
            }])
        }
        OperatorTransition::AssignedFirst | OperatorTransition::Reassigned => {
            let Some(new_operator) = new_operator.map(String::from) else {
                unreachable!("assignment transitions carry a new operator");
            };

            let direct = NotificationIntent {
                ticket_id: ticket.id.clone(),
                message: NotificationMessage::TicketAssignedToYou,
                responsible_id: new_operator.clone(),
                recipients: vec![new_operator.clone()],
            };

            let mut recipients = vec![ticket.creator_id.clone()];
            if let Some(old) = old_operator {
                recipients.push(old.to_string());
            }
            let broadcast = NotificationIntent {
                ticket_id: ticket.id.clone(),
                message: NotificationMessage::TicketAssigned,
                responsible_id: new_operator,
                recipients: dedup_preserving_order(recipients),
            };

            Ok(vec![direct, broadcast])
        }
    }
}

/// Drop duplicate identifiers, keeping the first occurrence of each.
fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
