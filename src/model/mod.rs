//! Core data types for `ticketry`.
//!
//! This module defines the fundamental types used throughout the crate:
//! - `Ticket` - The core work item
//! - `User` - An account with a role tag
//! - `Role` - User role categories
//! - `NotificationMessage` - The fixed notification message enumeration
//! - `Notification` - A persisted notification record
//! - `RecipientLink` - The notification-to-recipient join record
//! - `Attachment` - Metadata row for a stored file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role category.
///
/// Only `Operator` and `Admin` users are part of the unassignment roster;
/// `Regular` users are never notified that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Regular,
    Operator,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Operator => "operator",
            Self::Admin => "admin",
        }
    }

    /// True for roles included in the unassignment roster.
    #[must_use]
    pub const fn hears_unassignments(self) -> bool {
        matches!(self, Self::Operator | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::error::TicketryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "operator" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            other => Err(crate::error::TicketryError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// The fixed notification message enumeration.
///
/// Message text is not templated here; rendering/localization belongs to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationMessage {
    TicketUnassigned,
    TicketAssigned,
    TicketAssignedToYou,
}

impl NotificationMessage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TicketUnassigned => "ticket_unassigned",
            Self::TicketAssigned => "ticket_assigned",
            Self::TicketAssignedToYou => "ticket_assigned_to_you",
        }
    }

    /// True for messages addressed to exactly one user.
    #[must_use]
    pub const fn is_direct(self) -> bool {
        matches!(self, Self::TicketAssignedToYou)
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationMessage {
    type Err = crate::error::TicketryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ticket_unassigned" => Ok(Self::TicketUnassigned),
            "ticket_assigned" => Ok(Self::TicketAssigned),
            "ticket_assigned_to_you" => Ok(Self::TicketAssignedToYou),
            other => Err(crate::error::TicketryError::InvalidMessage {
                message: other.to_string(),
            }),
        }
    }
}

/// The primary ticket entity.
///
/// The notification core only reads `id`, `creator_id` and `operator_id`;
/// the descriptive fields ride along for callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Unique ID (e.g., "tk-abc123").
    pub id: String,

    /// Title.
    pub title: String,

    /// Detailed description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// User who created the ticket.
    pub creator_id: String,

    /// Currently assigned operator, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// A persisted notification record.
///
/// Created exactly once at ticket-edit time and never mutated by this core
/// afterward; the read flag is owned downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub ticket_id: String,
    /// User who triggered the notification.
    pub responsible_id: String,
    pub message: NotificationMessage,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

/// The join record between a notification and one recipient.
///
/// Uniqueness is (notification, recipient); the same recipient may hold
/// links against two different notifications from the same transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientLink {
    pub notification_id: i64,
    pub recipient_id: String,
    pub is_read: bool,
}

/// Metadata row for a stored attachment file.
///
/// `stored_path` is relative to the configured media root and must at all
/// times either match an existing file or the row must not exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: i64,
    pub ticket_id: String,
    pub stored_path: String,
    /// SHA-256 of the stored bytes, recorded at upload/replace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}
