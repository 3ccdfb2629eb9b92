mod support;

use rowbound_core::{EventKind, EventNotifier, Record, RecordEvent, Value, Verdict};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use support::{count_users, users_db, RecordingConnection, User};

fn vetoing(kind: EventKind) -> Arc<EventNotifier> {
    let mut notifier = EventNotifier::new();
    notifier.subscribe_fn(move |event: &RecordEvent<'_>| {
        if event.kind() == kind {
            Verdict::Veto
        } else {
            Verdict::Continue
        }
    });
    Arc::new(notifier)
}

#[test]
fn before_save_veto_returns_false_without_statements() {
    let conn = RecordingConnection::new(users_db());
    let mut user = Record::of::<User>(&conn).with_notifier(vetoing(EventKind::BeforeSave));
    user.set("name", "vetoed").unwrap();

    assert!(!user.save().unwrap());
    assert!(conn.statements().is_empty());
    assert!(user.is_new());
    assert_eq!(count_users(conn.inner()), 0);
}

#[test]
fn before_delete_veto_returns_false_and_keeps_row() {
    let conn = RecordingConnection::new(users_db());
    let mut user = Record::of::<User>(&conn).with_notifier(vetoing(EventKind::BeforeDelete));
    user.set("name", "kept").unwrap();
    assert!(user.save().unwrap());
    let issued = conn.statements().len();

    assert!(!user.delete().unwrap());
    assert_eq!(conn.statements().len(), issued);
    assert_eq!(count_users(conn.inner()), 1);
}

#[test]
fn lifecycle_events_fire_in_order_with_insert_flag() {
    let conn = users_db();
    let seen = Arc::new(Mutex::new(Vec::<(EventKind, Option<bool>)>::new()));
    let mut notifier = EventNotifier::new();
    let sink = Arc::clone(&seen);
    notifier.subscribe_fn(move |event: &RecordEvent<'_>| {
        sink.lock().unwrap().push((event.kind(), event.insert()));
        Verdict::Continue
    });
    let notifier = Arc::new(notifier);

    let mut user = Record::of::<User>(&conn).with_notifier(Arc::clone(&notifier));
    user.set("name", "olga").unwrap();
    user.save().unwrap();
    user.set("name", "olga 2").unwrap();
    user.save().unwrap();
    user.delete().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (EventKind::BeforeSave, Some(true)),
            (EventKind::AfterSave, None),
            (EventKind::BeforeSave, Some(false)),
            (EventKind::AfterSave, None),
            (EventKind::BeforeDelete, None),
            (EventKind::AfterDelete, None),
        ]
    );
}

#[test]
fn after_save_listener_sees_generated_key() {
    let conn = users_db();
    let captured = Arc::new(Mutex::new(None::<Value>));
    let mut notifier = EventNotifier::new();
    let sink = Arc::clone(&captured);
    notifier.subscribe_fn(move |event: &RecordEvent<'_>| {
        if let RecordEvent::AfterSave { record } = event {
            *sink.lock().unwrap() = record.primary_key_value().cloned();
        }
        Verdict::Continue
    });

    let mut user = Record::of::<User>(&conn).with_notifier(Arc::new(notifier));
    user.set("name", "pia").unwrap();
    user.save().unwrap();

    let key = captured.lock().unwrap().clone();
    assert_eq!(key.as_ref(), user.primary_key_value());
    assert!(key.and_then(|value| value.as_i64()).unwrap() > 0);
}

#[test]
fn cancelable_dispatch_stops_at_first_veto() {
    let conn = users_db();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut notifier = EventNotifier::new();

    notifier.subscribe_fn(|_event: &RecordEvent<'_>| Verdict::Veto);
    let counter = Arc::clone(&calls);
    notifier.subscribe_fn(move |_event: &RecordEvent<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Verdict::Continue
    });
    assert_eq!(notifier.len(), 2);

    let mut user = Record::of::<User>(&conn).with_notifier(Arc::new(notifier));
    user.set("name", "quinn").unwrap();

    assert!(!user.save().unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn notification_events_ignore_veto_and_reach_every_listener() {
    let conn = users_db();
    let after_calls = Arc::new(AtomicUsize::new(0));
    let mut notifier = EventNotifier::new();

    notifier.subscribe_fn(|event: &RecordEvent<'_>| match event.kind() {
        EventKind::AfterSave => Verdict::Veto,
        _ => Verdict::Continue,
    });
    let counter = Arc::clone(&after_calls);
    notifier.subscribe_fn(move |event: &RecordEvent<'_>| {
        if event.kind() == EventKind::AfterSave {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Verdict::Continue
    });

    let mut user = Record::of::<User>(&conn).with_notifier(Arc::new(notifier));
    user.set("name", "rae").unwrap();

    assert!(user.save().unwrap());
    assert_eq!(after_calls.load(Ordering::SeqCst), 1);
    assert_eq!(count_users(&conn), 1);
}

#[test]
fn one_notifier_serves_many_records() {
    let conn = users_db();
    let saves = Arc::new(AtomicUsize::new(0));
    let mut notifier = EventNotifier::new();
    let counter = Arc::clone(&saves);
    notifier.subscribe_fn(move |event: &RecordEvent<'_>| {
        if event.kind() == EventKind::AfterSave {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Verdict::Continue
    });
    let notifier = Arc::new(notifier);

    for name in ["s1", "s2", "s3"] {
        let mut user = Record::of::<User>(&conn).with_notifier(Arc::clone(&notifier));
        user.set("name", name).unwrap();
        user.save().unwrap();
    }

    assert_eq!(saves.load(Ordering::SeqCst), 3);
    assert_eq!(count_users(&conn), 3);
}

#[test]
fn rejected_assignment_does_not_block_later_save() {
    let conn = RecordingConnection::new(users_db());
    let calls = Arc::new(AtomicUsize::new(0));
    let mut notifier = EventNotifier::new();
    let counter = Arc::clone(&calls);
    notifier.subscribe_fn(move |_event: &RecordEvent<'_>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Verdict::Continue
    });

    let mut user = Record::of::<User>(&conn).with_notifier(Arc::new(notifier));
    user.set("name", "tess").unwrap();
    assert!(user.set("unknown", 1_i64).is_err());

    assert!(user.save().unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(conn.statements().len(), 1);
}
