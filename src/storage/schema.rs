//! Database schema definitions.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the ticketry database.
///
/// `user_notifications.recipient_id` deliberately carries no foreign key:
/// recipient sets may include identifiers that do not resolve to a user
/// row (a sentinel old-operator value, for instance), and those links must
/// still persist. Referential failures surface through the ticket side.
pub const SCHEMA_SQL: &str = r"
    -- Tickets
    CREATE TABLE IF NOT EXISTS tickets (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        creator_id TEXT NOT NULL,
        operator_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        CHECK (length(title) >= 1 AND length(title) <= 500)
    );

    CREATE INDEX IF NOT EXISTS idx_tickets_creator_id ON tickets(creator_id);
    CREATE INDEX IF NOT EXISTS idx_tickets_operator_id ON tickets(operator_id);
    CREATE INDEX IF NOT EXISTS idx_tickets_updated_at ON tickets(updated_at);

    -- Users
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        display_name TEXT,
        role TEXT NOT NULL DEFAULT 'regular'
    );

    CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

    -- Notifications
    CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id TEXT NOT NULL,
        responsible_id TEXT NOT NULL,
        message TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        sent_at TEXT NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_notifications_ticket_id ON notifications(ticket_id);
    CREATE INDEX IF NOT EXISTS idx_notifications_sent_at ON notifications(sent_at);

    -- Recipient links
    CREATE TABLE IF NOT EXISTS user_notifications (
        notification_id INTEGER NOT NULL,
        recipient_id TEXT NOT NULL,
        is_read INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (notification_id, recipient_id),
        FOREIGN KEY (notification_id) REFERENCES notifications(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_user_notifications_recipient ON user_notifications(recipient_id);

    -- Attachment metadata
    CREATE TABLE IF NOT EXISTS attachments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id TEXT NOT NULL,
        stored_path TEXT NOT NULL,
        content_hash TEXT,
        uploaded_at TEXT NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_attachments_ticket_id ON attachments(ticket_id);
";

/// Apply the schema to the database.
///
/// This uses `execute_batch` to run the entire DDL script.
/// It is idempotent because all statements use `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set journal mode to WAL for concurrency
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Enable foreign keys
    conn.pragma_update(None, "foreign_keys", "ON")?;

    Ok(())
}
