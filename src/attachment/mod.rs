//! Attachment storage: coordinated writes to a path-addressed filesystem
//! location and a metadata row, without a real two-phase commit.
//!
//! Ordering is fixed so inconsistency is bounded to "orphan file, no
//! orphan row": the filesystem step always runs strictly before the
//! metadata commit. A commit failure after a successful file step is the
//! one state this store cannot self-heal; it is surfaced as the
//! distinguished [`TicketryError::NotPersisted`] so callers can alert or
//! reconcile instead of silently succeeding.

pub mod path;

use crate::error::{Result, TicketryError};
use crate::model::Attachment;
use chrono::Utc;
use self::path::{dated_path, validate_path};
use rusqlite::{Connection, params};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filesystem + metadata coordinator for ticket attachments.
///
/// Stateless apart from the media root; safe to invoke concurrently for
/// different attachments. Callers owning the enclosing transaction/lock
/// are responsible for serializing concurrent calls against the same
/// path.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    media_root: PathBuf,
}

impl AttachmentStore {
    #[must_use]
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Store new attachment content and its metadata row.
    ///
    /// Writes `bytes` under `<media_root>/<year>/<month>/<day>/<file_name>`
    /// (creating intermediate directories), then inserts the metadata row.
    /// Returns the stored path, relative to the media root.
    ///
    /// # Errors
    ///
    /// - [`TicketryError::InvalidPath`] if `file_name` fails the safety
    ///   rule; nothing is written.
    /// - [`TicketryError::Io`] if the filesystem write fails; no row is
    ///   created.
    /// - [`TicketryError::NotPersisted`] if the write succeeded but the
    ///   row insert failed; the file is an orphan at the returned path.
    pub fn create(
        &self,
        conn: &Connection,
        ticket_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        validate_path(file_name)?;

        let stored = dated_path(Utc::now(), file_name);
        self.write_content(&stored, bytes)?;

        self.insert_row(conn, ticket_id, &stored, bytes)
            .map_err(|source| not_persisted(&stored, source))?;

        debug!(ticket = %ticket_id, path = %stored, "attachment stored");
        Ok(stored)
    }

    /// Replace an attachment's content, pointing its row at the new path.
    ///
    /// Validates both paths first (nothing is touched on failure), then
    /// deletes the old file (a missing file is already "gone"; any other
    /// I/O failure aborts with row and old file untouched), then writes
    /// the new content and updates the row.
    ///
    /// If the new write fails after the old file was deleted, the row is
    /// left pointing at the deleted path; that inconsistency window is
    /// inherent to the delete-then-write ordering and surfaces as
    /// [`TicketryError::Io`].
    ///
    /// # Errors
    ///
    /// As [`Self::create`], plus [`TicketryError::InvalidPath`] for an
    /// unsafe `old_stored_path`.
    pub fn replace(
        &self,
        conn: &Connection,
        attachment_id: i64,
        file_name: &str,
        bytes: &[u8],
        old_stored_path: &str,
    ) -> Result<String> {
        validate_path(old_stored_path)?;
        validate_path(file_name)?;

        self.remove_file_if_present(old_stored_path)?;

        let stored = dated_path(Utc::now(), file_name);
        self.write_content(&stored, bytes)?;

        self.update_row(conn, attachment_id, &stored, bytes)
            .map_err(|source| not_persisted(&stored, source))?;

        debug!(attachment = attachment_id, path = %stored, "attachment replaced");
        Ok(stored)
    }

    /// Delete an attachment's file and metadata row.
    ///
    /// Validates the stored path, deletes the file if present, and only
    /// then removes the row: the store refuses to delete anything it
    /// cannot prove is safe.
    ///
    /// # Errors
    ///
    /// - [`TicketryError::InvalidPath`]: nothing is removed.
    /// - [`TicketryError::Io`]: the file could not be deleted; the row is
    ///   kept.
    /// - [`TicketryError::NotPersisted`]: the file is gone but the row
    ///   removal failed; the row is stale.
    pub fn delete(&self, conn: &Connection, attachment_id: i64, stored_path: &str) -> Result<()> {
        validate_path(stored_path)?;

        self.remove_file_if_present(stored_path)?;

        conn.execute(
            "DELETE FROM attachments WHERE id = ?1",
            [attachment_id],
        )
        .map_err(|source| not_persisted(stored_path, source))?;

        debug!(attachment = attachment_id, path = %stored_path, "attachment deleted");
        Ok(())
    }

    /// Absolute filesystem location of a stored path.
    #[must_use]
    pub fn resolve(&self, stored_path: &str) -> PathBuf {
        self.media_root.join(stored_path)
    }

    fn write_content(&self, stored_path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(stored_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        Ok(())
    }

    fn remove_file_if_present(&self, stored_path: &str) -> Result<()> {
        let target = self.resolve(stored_path);
        match fs::remove_file(&target) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_row(
        &self,
        conn: &Connection,
        ticket_id: &str,
        stored_path: &str,
        bytes: &[u8],
    ) -> std::result::Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO attachments (ticket_id, stored_path, content_hash, uploaded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                ticket_id,
                stored_path,
                content_hash(bytes),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_row(
        &self,
        conn: &Connection,
        attachment_id: i64,
        stored_path: &str,
        bytes: &[u8],
    ) -> std::result::Result<(), rusqlite::Error> {
        conn.execute(
            "UPDATE attachments SET stored_path = ?1, content_hash = ?2, uploaded_at = ?3
             WHERE id = ?4",
            params![
                stored_path,
                content_hash(bytes),
                Utc::now().to_rfc3339(),
                attachment_id,
            ],
        )?;
        Ok(())
    }
}

/// Fetch the row for an attachment, for callers that only hold the ID.
///
/// # Errors
///
/// Returns [`TicketryError::AttachmentNotFound`] if no row exists.
pub fn require_attachment(conn: &Connection, attachment_id: i64) -> Result<Attachment> {
    use rusqlite::OptionalExtension;
    conn.query_row(
        "SELECT id, ticket_id, stored_path, content_hash, uploaded_at
         FROM attachments WHERE id = ?1",
        [attachment_id],
        crate::storage::sqlite::row_to_attachment,
    )
    .optional()?
    .ok_or(TicketryError::AttachmentNotFound { id: attachment_id })
}

/// SHA-256 of the stored bytes, hex-encoded.
fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn not_persisted(stored_path: &str, source: rusqlite::Error) -> TicketryError {
    warn!(
        path = %stored_path,
        error = %source,
        "attachment file step succeeded but metadata commit failed"
    );
    TicketryError::NotPersisted {
        path: stored_path.to_string(),
        source,
    }
}
