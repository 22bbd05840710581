use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio_test::{assert_pending, assert_ready};
use timetable_core::errors::TimetableError;
use timetable_core::models::{DayLabel, Lecture, ScheduleEntry, SlotRange, Table};
use timetable_core::store::{
    SEED_TABLE_ID, ScheduleStore, SequentialIds, TableIdGenerator, Timetables, UuidIds,
};

fn lecture(id: &str) -> Arc<Lecture> {
    Arc::new(Lecture {
        id: id.to_string(),
        title: format!("Course {}", id),
        credits: "3".to_string(),
        grade: 1,
        major: "수학과".to_string(),
        raw_schedule: String::new(),
    })
}

fn entry(id: &str, day: DayLabel, first: i32, last: i32) -> ScheduleEntry {
    ScheduleEntry {
        day,
        range: SlotRange::inclusive(first, last).unwrap(),
        room: "101".to_string(),
        lecture: lecture(id),
    }
}

#[test]
fn test_new_store_has_seed_table() {
    let store = ScheduleStore::new();
    let snapshot = store.snapshot();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec![SEED_TABLE_ID]);
    assert!(snapshot.entries(SEED_TABLE_ID).unwrap().is_empty());
}

#[test]
fn test_timetables_require_a_table() {
    assert!(Timetables::new(Vec::new()).is_err());
    assert!(Timetables::new(vec![Table::empty("a"), Table::empty("a")]).is_err());
}

#[test]
fn test_add_entries_appends_in_order() {
    let store = ScheduleStore::new();
    let actions = store.actions();

    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 2)])
        .unwrap();
    actions
        .add_entries(
            SEED_TABLE_ID,
            vec![entry("b", DayLabel::Tue, 3, 4), entry("c", DayLabel::Wed, 5, 5)],
        )
        .unwrap();

    let ids: Vec<_> = store
        .snapshot()
        .entries(SEED_TABLE_ID)
        .unwrap()
        .iter()
        .map(|entry| entry.lecture.id.clone())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_add_entries_to_unknown_table_fails() {
    let store = ScheduleStore::new();
    let before = store.snapshot();

    let result = store
        .actions()
        .add_entries("missing", vec![entry("a", DayLabel::Mon, 1, 2)]);

    assert_eq!(result, Err(TimetableError::UnknownTable("missing".to_string())));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_remove_entry_removes_all_covering_entries() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(
            SEED_TABLE_ID,
            vec![
                entry("covers", DayLabel::Mon, 2, 4),
                entry("after", DayLabel::Mon, 5, 6),
                entry("other-day", DayLabel::Tue, 3, 3),
                entry("also-covers", DayLabel::Mon, 3, 3),
            ],
        )
        .unwrap();

    actions.remove_entry(SEED_TABLE_ID, DayLabel::Mon, 3).unwrap();

    let remaining: Vec<_> = store
        .snapshot()
        .entries(SEED_TABLE_ID)
        .unwrap()
        .iter()
        .map(|entry| entry.lecture.id.clone())
        .collect();
    assert_eq!(remaining, vec!["after", "other-day"]);
}

#[test]
fn test_remove_entry_without_match_publishes_nothing() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 5, 6)])
        .unwrap();
    let before = store.snapshot();

    actions.remove_entry(SEED_TABLE_ID, DayLabel::Mon, 3).unwrap();

    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_duplicate_table_copies_entries() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 2)])
        .unwrap();

    let copy_id = actions.duplicate_table(SEED_TABLE_ID).unwrap();
    assert_eq!(copy_id, "schedule-2");

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.entries(&copy_id).unwrap(),
        snapshot.entries(SEED_TABLE_ID).unwrap()
    );

    actions.update_entry_position(&copy_id, 0, DayLabel::Fri, 2).unwrap();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("b", DayLabel::Tue, 1, 1)])
        .unwrap();

    let snapshot = store.snapshot();
    let original = snapshot.entries(SEED_TABLE_ID).unwrap();
    let copy = snapshot.entries(&copy_id).unwrap();
    assert_eq!(original.len(), 2);
    assert_eq!(original[0].day, DayLabel::Mon);
    assert_eq!(copy.len(), 1);
    assert_eq!(copy[0].day, DayLabel::Fri);
    assert_eq!(copy[0].range, SlotRange::inclusive(3, 4).unwrap());
}

#[test]
fn test_duplicate_unknown_table_fails() {
    let store = ScheduleStore::new();
    let result = store.actions().duplicate_table("missing");
    assert_eq!(result, Err(TimetableError::UnknownTable("missing".to_string())));
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn test_duplicate_with_uuid_ids() {
    let store = ScheduleStore::with_id_generator(UuidIds);
    let actions = store.actions();

    let first = actions.duplicate_table(SEED_TABLE_ID).unwrap();
    let second = actions.duplicate_table(SEED_TABLE_ID).unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with("schedule-"));
    assert_eq!(store.snapshot().len(), 3);
}

#[test]
fn test_colliding_generated_id_is_rejected() {
    let store = ScheduleStore::with_id_generator(SequentialIds::starting_at(1));
    let result = store.actions().duplicate_table(SEED_TABLE_ID);

    assert!(matches!(result, Err(TimetableError::Validation(_))));
    assert_eq!(store.snapshot().len(), 1);
}

#[test]
fn test_sequential_ids() {
    let ids = SequentialIds::default();
    assert_eq!(ids.next_id(), "schedule-2");
    assert_eq!(ids.next_id(), "schedule-3");
}

#[test]
fn test_remove_last_table_is_rejected() {
    let store = ScheduleStore::new();
    let before = store.snapshot();

    let result = store.actions().remove_table(SEED_TABLE_ID);

    assert_eq!(result, Err(TimetableError::LastTable));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_remove_table() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    let copy_id = actions.duplicate_table(SEED_TABLE_ID).unwrap();

    actions.remove_table(SEED_TABLE_ID).unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.ids().collect::<Vec<_>>(), vec![copy_id.as_str()]);
    assert_eq!(actions.remove_table(&copy_id), Err(TimetableError::LastTable));
}

#[test]
fn test_update_entry_position_round_trip() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    let original = entry("a", DayLabel::Tue, 4, 6);
    actions.add_entries(SEED_TABLE_ID, vec![original.clone()]).unwrap();

    actions.update_entry_position(SEED_TABLE_ID, 0, DayLabel::Thu, -2).unwrap();
    let moved = store.snapshot().entries(SEED_TABLE_ID).unwrap()[0].clone();
    assert_eq!(moved.day, DayLabel::Thu);
    assert_eq!(moved.range, SlotRange::inclusive(2, 4).unwrap());

    actions.update_entry_position(SEED_TABLE_ID, 0, DayLabel::Tue, 2).unwrap();
    assert_eq!(store.snapshot().entries(SEED_TABLE_ID).unwrap()[0], original);
}

#[test]
fn test_update_entry_position_out_of_bounds() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
        .unwrap();
    let before = store.snapshot();

    let result = actions.update_entry_position(SEED_TABLE_ID, 1, DayLabel::Mon, 0);

    assert_eq!(
        result,
        Err(TimetableError::EntryIndexOutOfRange {
            table_id: SEED_TABLE_ID.to_string(),
            index: 1,
            len: 1,
        })
    );
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_update_entry_position_rejects_overflowing_offset() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 2)])
        .unwrap();
    let before = store.snapshot();

    let result = actions.update_entry_position(SEED_TABLE_ID, 0, DayLabel::Tue, i32::MAX);

    assert!(matches!(result, Err(TimetableError::Validation(_))));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn test_update_entry_position_trusts_input() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 22, 24)])
        .unwrap();

    actions.update_entry_position(SEED_TABLE_ID, 0, DayLabel::Mon, 3).unwrap();

    let snapshot = store.snapshot();
    let moved = &snapshot.entries(SEED_TABLE_ID).unwrap()[0];
    assert_eq!(moved.range.last(), 27);
}

#[test]
fn test_reader_snapshot_is_immutable() {
    let store = ScheduleStore::new();
    let reader = store.reader();
    let before = reader.snapshot();

    store
        .actions()
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
        .unwrap();

    assert!(before.entries(SEED_TABLE_ID).unwrap().is_empty());
    assert_eq!(reader.snapshot().entries(SEED_TABLE_ID).unwrap().len(), 1);
}

#[test]
fn test_untouched_tables_share_storage() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    let copy_id = actions.duplicate_table(SEED_TABLE_ID).unwrap();
    let before = store.snapshot().table(&copy_id).unwrap().shared_entries();

    actions
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
        .unwrap();

    let after = store.snapshot().table(&copy_id).unwrap().shared_entries();
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn test_action_handles_are_stable() {
    let store = ScheduleStore::new();
    let first = store.actions();
    let second = first.clone();

    first
        .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
        .unwrap();

    assert!(first.same_store(&second));
    assert!(first.same_store(&store.actions()));
    assert!(!first.same_store(&ScheduleStore::new().actions()));
}

#[test]
fn test_table_watcher_ignores_other_tables() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    let other = actions.duplicate_table(SEED_TABLE_ID).unwrap();
    let mut watcher = store.reader().subscribe_table(SEED_TABLE_ID);

    {
        let mut changed = tokio_test::task::spawn(watcher.changed());
        assert_pending!(changed.poll());

        actions
            .add_entries(&other, vec![entry("x", DayLabel::Mon, 1, 1)])
            .unwrap();
        assert_pending!(changed.poll());

        actions
            .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
            .unwrap();
        assert!(changed.is_woken());
        let entries = assert_ready!(changed.poll()).expect("table still exists");
        assert_eq!(entries.len(), 1);
    }

    assert_eq!(watcher.current().unwrap().len(), 1);
}

#[tokio::test]
async fn test_table_watcher_reports_removal() {
    let store = ScheduleStore::new();
    let actions = store.actions();
    let copy_id = actions.duplicate_table(SEED_TABLE_ID).unwrap();
    let mut watcher = store.reader().subscribe_table(copy_id.clone());

    actions.remove_table(&copy_id).unwrap();

    assert_eq!(watcher.changed().await, None);
}

#[tokio::test]
async fn test_reader_sees_every_publish() {
    let store = ScheduleStore::new();
    let mut reader = store.reader();
    let actions = store.actions();

    let writer = tokio::spawn(async move {
        actions
            .add_entries(SEED_TABLE_ID, vec![entry("a", DayLabel::Mon, 1, 1)])
            .unwrap();
    });

    let snapshot = reader.changed().await.expect("store alive");
    writer.await.unwrap();
    assert_eq!(snapshot.entries(SEED_TABLE_ID).unwrap().len(), 1);
}

#[tokio::test]
async fn test_reader_ends_when_store_dropped() {
    let store = ScheduleStore::new();
    let mut reader = store.reader();
    drop(store);

    assert_eq!(reader.changed().await, None);
}
