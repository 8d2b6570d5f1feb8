//! Persistence fan-out for notification intents.
//!
//! The dispatcher records what the fan-out engine decided; it decides
//! nothing itself. It writes against a caller-supplied connection, so the
//! enclosing handler owns the transaction boundary: a failed intent is
//! surfaced with its index, and earlier intents in the same call are not
//! rolled back here (`rusqlite::Transaction` derefs to `Connection`, pass
//! `&tx` to run inside a transaction).

use crate::error::{Result, TicketryError};
use crate::notify::fanout::NotificationIntent;
use chrono::Utc;
use rusqlite::{Connection, params};
use std::collections::HashSet;
use tracing::debug;

/// Persist each intent as one notification row plus one recipient-link
/// row per distinct recipient, in list order.
///
/// Returns the ids of the created notification rows, in intent order.
///
/// # Errors
///
/// Returns [`TicketryError::DispatchFailed`] identifying the failing
/// intent if the store rejects a write (e.g. a referential constraint
/// because the ticket identifier does not exist). No retry, no rollback
/// of earlier intents.
pub fn dispatch(conn: &Connection, intents: &[NotificationIntent]) -> Result<Vec<i64>> {
    let mut notification_ids = Vec::with_capacity(intents.len());

    for (index, intent) in intents.iter().enumerate() {
        let id = insert_intent(conn, intent).map_err(|source| TicketryError::DispatchFailed {
            index,
            message: intent.message.as_str().to_string(),
            source,
        })?;
        notification_ids.push(id);
    }

    debug!(count = notification_ids.len(), "dispatched notification intents");
    Ok(notification_ids)
}

/// Insert one notification row and its recipient links.
///
/// Recipients are deduplicated within the intent; the same recipient may
/// already hold a link against a different notification from the same
/// call, which is legitimate.
fn insert_intent(
    conn: &Connection,
    intent: &NotificationIntent,
) -> std::result::Result<i64, rusqlite::Error> {
    let sent_at = Utc::now();
    conn.execute(
        "INSERT INTO notifications (ticket_id, responsible_id, message, is_read, sent_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![
            intent.ticket_id,
            intent.responsible_id,
            intent.message.as_str(),
            sent_at.to_rfc3339(),
        ],
    )?;
    let notification_id = conn.last_insert_rowid();

    let mut seen = HashSet::new();
    for recipient in &intent.recipients {
        if !seen.insert(recipient.as_str()) {
            continue;
        }
        conn.execute(
            "INSERT INTO user_notifications (notification_id, recipient_id, is_read)
             VALUES (?1, ?2, 0)",
            params![notification_id, recipient],
        )?;
    }

    Ok(notification_id)
}
