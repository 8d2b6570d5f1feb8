//! `SQLite` storage implementation.

use crate::error::{Result, TicketryError};
use crate::model::{
    Attachment, Notification, NotificationMessage, RecipientLink, Role, Ticket, User,
};
use crate::notify::dispatch::dispatch;
use crate::notify::fanout::{RosterLookup, fan_out};
use crate::storage::schema::apply_schema;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// SQLite-based store for the ticketry core.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Borrow the underlying connection.
    ///
    /// The attachment store takes a connection for its metadata writes;
    /// this is the seam that hands it one.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // USERS
    // ========================================================================

    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. ID collision).
    pub fn create_user(&mut self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, display_name, role) VALUES (?1, ?2, ?3)",
            params![user.id, user.display_name, user.role.as_str()],
        )?;
        Ok(())
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, display_name, role FROM users WHERE id = ?1",
                [id],
                row_to_user,
            )
            .optional()
            .map_err(TicketryError::from)
    }

    /// All users whose role is Operator or Admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn operators_and_admins(&self) -> Result<Vec<User>> {
        roster_query(&self.conn)
    }

    // ========================================================================
    // TICKETS
    // ========================================================================

    /// Insert a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. ID collision).
    pub fn create_ticket(&mut self, ticket: &Ticket) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tickets (id, title, description, creator_id, operator_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ticket.id,
                ticket.title,
                ticket.description.as_deref().unwrap_or(""),
                ticket.creator_id,
                ticket.operator_id,
                ticket.created_at.to_rfc3339(),
                ticket.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a ticket by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_ticket(&self, id: &str) -> Result<Option<Ticket>> {
        get_ticket_on(&self.conn, id)
    }

    // ========================================================================
    // TICKET EDIT HANDLER
    // ========================================================================

    /// Change a ticket's operator assignment and fan out notifications.
    ///
    /// The whole edit runs in one Immediate transaction: the ticket row
    /// update, the roster lookup (unassignment only), and the dispatch of
    /// every computed intent. A failed dispatch aborts the batch, so the
    /// edit is never reported successful with half its notifications
    /// missing.
    ///
    /// Returns the ids of the created notification rows (empty for a
    /// no-op transition).
    ///
    /// # Errors
    ///
    /// Returns [`TicketryError::TicketNotFound`] for an unknown ticket,
    /// or a database/dispatch error.
    pub fn set_operator(
        &mut self,
        ticket_id: &str,
        new_operator: Option<&str>,
        editor: &str,
    ) -> Result<Vec<i64>> {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let ticket = get_ticket_on(&tx, ticket_id)?.ok_or_else(|| {
            TicketryError::TicketNotFound {
                id: ticket_id.to_string(),
            }
        })?;
        let old_operator = ticket.operator_id.clone();

        let now = Utc::now();
        tx.execute(
            "UPDATE tickets SET operator_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_operator, now.to_rfc3339(), ticket_id],
        )?;

        let updated = Ticket {
            operator_id: new_operator.map(String::from),
            updated_at: now,
            ..ticket
        };

        let roster = ConnRoster(&tx);
        let intents = fan_out(&updated, old_operator.as_deref(), editor, &roster)?;
        let notification_ids = dispatch(&tx, &intents)?;

        tx.commit()?;

        debug!(
            ticket = %ticket_id,
            editor = %editor,
            notifications = notification_ids.len(),
            "operator assignment updated"
        );
        Ok(notification_ids)
    }

    // ========================================================================
    // NOTIFICATION READS
    // ========================================================================

    /// All notifications for a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn notifications_for_ticket(&self, ticket_id: &str) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, responsible_id, message, is_read, sent_at
             FROM notifications WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([ticket_id], row_to_notification)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Recipient links of one notification, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recipients_of(&self, notification_id: i64) -> Result<Vec<RecipientLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT notification_id, recipient_id, is_read
             FROM user_notifications WHERE notification_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([notification_id], |row| {
                Ok(RecipientLink {
                    notification_id: row.get(0)?,
                    recipient_id: row.get(1)?,
                    is_read: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Notifications addressed to a recipient, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.ticket_id, n.responsible_id, n.message, n.is_read, n.sent_at
             FROM notifications n
             INNER JOIN user_notifications un ON un.notification_id = n.id
             WHERE un.recipient_id = ?1
             ORDER BY n.id DESC",
        )?;
        let rows = stmt
            .query_map([user_id], row_to_notification)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Count of unread recipient links for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn unread_count_for(&self, user_id: &str) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM user_notifications WHERE recipient_id = ?1 AND is_read = 0",
                [user_id],
                |row| row.get(0),
            )
            .map_err(TicketryError::from)
    }

    // ========================================================================
    // ATTACHMENT READS
    // ========================================================================

    /// Fetch an attachment row by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_attachment(&self, id: i64) -> Result<Option<Attachment>> {
        self.conn
            .query_row(
                "SELECT id, ticket_id, stored_path, content_hash, uploaded_at
                 FROM attachments WHERE id = ?1",
                [id],
                row_to_attachment,
            )
            .optional()
            .map_err(TicketryError::from)
    }

    /// All attachment rows for a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn attachments_for_ticket(&self, ticket_id: &str) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, ticket_id, stored_path, content_hash, uploaded_at
             FROM attachments WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([ticket_id], row_to_attachment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RosterLookup for SqliteStore {
    fn operators_and_admins(&self) -> Result<Vec<User>> {
        roster_query(&self.conn)
    }
}

/// Roster capability over a borrowed connection, used inside the
/// `set_operator` transaction (`Transaction` derefs to `Connection`).
struct ConnRoster<'a>(&'a Connection);

impl RosterLookup for ConnRoster<'_> {
    fn operators_and_admins(&self) -> Result<Vec<User>> {
        roster_query(self.0)
    }
}

fn roster_query(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, display_name, role FROM users
         WHERE role IN ('operator', 'admin') ORDER BY id",
    )?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(users)
}

fn get_ticket_on(conn: &Connection, id: &str) -> Result<Option<Ticket>> {
    conn.query_row(
        "SELECT id, title, description, creator_id, operator_id, created_at, updated_at
         FROM tickets WHERE id = ?1",
        [id],
        row_to_ticket,
    )
    .optional()
    .map_err(TicketryError::from)
}

fn row_to_ticket(row: &Row<'_>) -> std::result::Result<Ticket, rusqlite::Error> {
    let description: String = row.get(2)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Ticket {
        id: row.get(0)?,
        title: row.get(1)?,
        description: if description.is_empty() {
            None
        } else {
            Some(description)
        },
        creator_id: row.get(3)?,
        operator_id: row.get(4)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn row_to_user(row: &Row<'_>) -> std::result::Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        role: row
            .get::<_, String>(2)?
            .parse()
            .unwrap_or(Role::Regular),
    })
}

fn row_to_notification(row: &Row<'_>) -> std::result::Result<Notification, rusqlite::Error> {
    let sent_at: String = row.get(5)?;
    Ok(Notification {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        responsible_id: row.get(2)?,
        message: row
            .get::<_, String>(3)?
            .parse()
            .unwrap_or(NotificationMessage::TicketAssigned),
        is_read: row.get(4)?,
        sent_at: parse_datetime(&sent_at),
    })
}

pub(crate) fn row_to_attachment(row: &Row<'_>) -> std::result::Result<Attachment, rusqlite::Error> {
    let uploaded_at: String = row.get(4)?;
    Ok(Attachment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        stored_path: row.get(2)?,
        content_hash: row.get(3)?,
        uploaded_at: parse_datetime(&uploaded_at),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }

    Utc::now()
}
