#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use ticketry::error::Result;
use ticketry::model::{Role, Ticket, User};
use ticketry::notify::RosterLookup;
use ticketry::storage::SqliteStore;

/// Base time for test fixtures; fixed for determinism.
pub fn base_time() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_767_225_600, 0).unwrap() // 2026-01-01 00:00:00 UTC
}

pub fn ticket(id: &str, creator: &str, operator: Option<&str>) -> Ticket {
    let base = base_time();
    Ticket {
        id: id.to_string(),
        title: format!("Ticket {id}"),
        description: None,
        creator_id: creator.to_string(),
        operator_id: operator.map(String::from),
        created_at: base,
        updated_at: base + Duration::seconds(1),
    }
}

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        display_name: None,
        role,
    }
}

/// A roster resolved from a fixed user list, no store behind it.
pub struct FixedRoster(pub Vec<User>);

impl FixedRoster {
    pub fn of(users: &[(&str, Role)]) -> Self {
        Self(
            users
                .iter()
                .filter(|(_, role)| role.hears_unassignments())
                .map(|(id, role)| user(id, *role))
                .collect(),
        )
    }
}

impl RosterLookup for FixedRoster {
    fn operators_and_admins(&self) -> Result<Vec<User>> {
        Ok(self.0.clone())
    }
}

/// A roster that fails the test if consulted.
pub struct ForbiddenRoster;

impl RosterLookup for ForbiddenRoster {
    fn operators_and_admins(&self) -> Result<Vec<User>> {
        panic!("roster must not be consulted for this transition");
    }
}

/// Seed a store with one ticket and the standard user cast:
/// creator `carol` (regular), operators `o1`/`o2`, admin `a1`,
/// regular bystander `r1`.
pub fn seed_ticket(store: &mut SqliteStore, ticket_id: &str, operator: Option<&str>) {
    for (id, role) in [
        ("carol", Role::Regular),
        ("o1", Role::Operator),
        ("o2", Role::Operator),
        ("a1", Role::Admin),
        ("r1", Role::Regular),
    ] {
        store.create_user(&user(id, role)).expect("create user");
    }
    store
        .create_ticket(&ticket(ticket_id, "carol", operator))
        .expect("create ticket");
}
