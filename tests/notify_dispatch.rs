//! Dispatcher tests with real `SQLite` (no mocks): row counts, link
//! sets, per-intent failure reporting.

mod common;

use common::fixtures::seed_ticket;
use common::test_db;
use ticketry::TicketryError;
use ticketry::model::NotificationMessage;
use ticketry::notify::{NotificationIntent, dispatch};

fn intent(
    ticket_id: &str,
    message: NotificationMessage,
    responsible: &str,
    recipients: &[&str],
) -> NotificationIntent {
    NotificationIntent {
        ticket_id: ticket_id.to_string(),
        message,
        responsible_id: responsible.to_string(),
        recipients: recipients.iter().map(ToString::to_string).collect(),
    }
}

#[test]
fn dispatch_persists_rows_in_intent_order() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let intents = vec![
        intent(
            "tk-1",
            NotificationMessage::TicketAssignedToYou,
            "o1",
            &["o1"],
        ),
        intent(
            "tk-1",
            NotificationMessage::TicketAssigned,
            "o1",
            &["carol"],
        ),
    ];
    let ids = dispatch(store.connection(), &intents).unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] < ids[1]);

    let notifications = store.notifications_for_ticket("tk-1").unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(
        notifications[0].message,
        NotificationMessage::TicketAssignedToYou
    );
    assert_eq!(notifications[1].message, NotificationMessage::TicketAssigned);
    assert!(notifications.iter().all(|n| !n.is_read));
    assert!(notifications.iter().all(|n| n.responsible_id == "o1"));
}

#[test]
fn every_notification_gets_at_least_one_link() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let intents = vec![
        intent(
            "tk-1",
            NotificationMessage::TicketAssignedToYou,
            "o1",
            &["o1"],
        ),
        intent(
            "tk-1",
            NotificationMessage::TicketAssigned,
            "o1",
            &["carol", "o2"],
        ),
    ];
    let ids = dispatch(store.connection(), &intents).unwrap();

    for id in ids {
        assert!(!store.recipients_of(id).unwrap().is_empty());
    }
}

#[test]
fn links_are_unread_and_ordered() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let ids = dispatch(
        store.connection(),
        &[intent(
            "tk-1",
            NotificationMessage::TicketUnassigned,
            "ed",
            &["carol", "o1", "a1"],
        )],
    )
    .unwrap();

    let links = store.recipients_of(ids[0]).unwrap();
    let recipients: Vec<&str> = links.iter().map(|l| l.recipient_id.as_str()).collect();
    assert_eq!(recipients, ["carol", "o1", "a1"]);
    assert!(links.iter().all(|l| !l.is_read));
}

#[test]
fn duplicate_recipients_collapse_within_an_intent() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let ids = dispatch(
        store.connection(),
        &[intent(
            "tk-1",
            NotificationMessage::TicketUnassigned,
            "ed",
            &["carol", "carol", "o1", "carol"],
        )],
    )
    .unwrap();

    let links = store.recipients_of(ids[0]).unwrap();
    assert_eq!(links.len(), 2);
}

#[test]
fn same_recipient_may_link_to_two_notifications() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    dispatch(
        store.connection(),
        &[
            intent(
                "tk-1",
                NotificationMessage::TicketAssignedToYou,
                "o1",
                &["o1"],
            ),
            intent("tk-1", NotificationMessage::TicketAssigned, "o1", &["o1"]),
        ],
    )
    .unwrap();

    assert_eq!(store.unread_count_for("o1").unwrap(), 2);
    assert_eq!(store.notifications_for_user("o1").unwrap().len(), 2);
}

#[test]
fn sentinel_recipient_links_persist() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let ids = dispatch(
        store.connection(),
        &[intent(
            "tk-1",
            NotificationMessage::TicketAssigned,
            "o1",
            &["carol", ""],
        )],
    )
    .unwrap();

    let links = store.recipients_of(ids[0]).unwrap();
    let recipients: Vec<&str> = links.iter().map(|l| l.recipient_id.as_str()).collect();
    assert_eq!(recipients, ["carol", ""]);
}

#[test]
fn dispatch_failure_identifies_the_intent() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let intents = vec![
        intent(
            "tk-1",
            NotificationMessage::TicketAssignedToYou,
            "o1",
            &["o1"],
        ),
        // Unknown ticket id trips the foreign key on notifications.
        intent(
            "tk-ghost",
            NotificationMessage::TicketAssigned,
            "o1",
            &["carol"],
        ),
    ];

    let err = dispatch(store.connection(), &intents).unwrap_err();
    match err {
        TicketryError::DispatchFailed { index, message, .. } => {
            assert_eq!(index, 1);
            assert_eq!(message, "ticket_assigned");
        }
        other => panic!("expected DispatchFailed, got {other}"),
    }

    // The dispatcher does not roll back earlier intents; that is the
    // enclosing transaction's call.
    assert_eq!(store.notifications_for_ticket("tk-1").unwrap().len(), 1);
}

#[test]
fn dispatch_of_nothing_writes_nothing() {
    let mut store = test_db();
    seed_ticket(&mut store, "tk-1", None);

    let ids = dispatch(store.connection(), &[]).unwrap();
    assert!(ids.is_empty());
    assert!(store.notifications_for_ticket("tk-1").unwrap().is_empty());
}
