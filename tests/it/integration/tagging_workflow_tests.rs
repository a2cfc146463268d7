//! Tagging a table, persisting the overlay and reopening it.

use crate::helpers::{SUPER_HEADER, TimelineFixture, super_row};
use std::sync::mpsc::TryRecvError;
use timeline_viewer::{Cell, TableEvent, TimelineError};

fn super_fixture(rows: usize) -> crate::helpers::BuiltFixture {
    TimelineFixture::new("host1.csv")
        .header(SUPER_HEADER)
        .rows((0..rows).map(|i| super_row(&format!("event {}", i))))
        .build()
}

#[test]
fn test_tag_save_reopen() {
    let fixture = super_fixture(50);
    let table = fixture.open().unwrap();
    assert!(table.tagged_rows().is_empty());
    assert!(!table.is_dirty());

    for row in [49, 3, 17] {
        assert!(table.set_tag(row, true));
    }
    assert!(table.is_dirty());
    assert_eq!(table.get_cell(3, 7), Cell::Tag(true));
    assert_eq!(table.get_cell(4, 7), Cell::Tag(false));

    table.save().unwrap();
    assert!(!table.is_dirty());
    assert_eq!(table.tag_path(), fixture.tag_file());
    assert_eq!(std::fs::read_to_string(fixture.tag_file()).unwrap(), "3\n17\n49\n");
    drop(table);

    let reopened = fixture.open().unwrap();
    assert_eq!(reopened.tagged_rows(), vec![3, 17, 49]);
    assert!(!reopened.is_dirty());
    assert_eq!(reopened.get_cell(17, 7), Cell::Tag(true));
}

#[test]
fn test_source_file_is_never_modified() {
    let fixture = super_fixture(5);
    let before = std::fs::read(&fixture.path).unwrap();

    let table = fixture.open().unwrap();
    table.set_tag(2, true);
    table.save().unwrap();

    assert_eq!(std::fs::read(&fixture.path).unwrap(), before);
}

#[test]
fn test_events_follow_effective_changes() {
    let fixture = super_fixture(3);
    let table = fixture.open().unwrap();
    let events = table.subscribe();

    assert!(table.set_tag(1, true));
    assert!(!table.set_tag(1, true));
    assert!(!table.set_tag(2, false));
    assert!(!table.set_tag(3, true));

    assert_eq!(
        events.try_recv(),
        Ok(TableEvent::TagChanged { row: 1, tagged: true, dirty: true })
    );
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));

    table.save().unwrap();
    assert_eq!(events.try_recv(), Ok(TableEvent::Saved));
}

#[test]
fn test_every_subscriber_is_notified() {
    let fixture = super_fixture(2);
    let table = fixture.open().unwrap();
    let first = table.subscribe();
    let second = table.subscribe();
    drop(first);

    table.set_tag(0, true);
    assert!(matches!(second.try_recv(), Ok(TableEvent::TagChanged { row: 0, .. })));
}

#[test]
fn test_stale_sidecar_entries_dropped_on_open() {
    let fixture = super_fixture(10);
    fixture.write_tag_file("2\n9\n10\n500\n-3\nfoo\n\n 4 \n");

    let table = fixture.open().unwrap();
    assert_eq!(table.tagged_rows(), vec![2, 4, 9]);
    assert!(!table.is_dirty());
}

#[test]
fn test_untag_to_empty_and_save() {
    let fixture = super_fixture(4);
    fixture.write_tag_file("1\n");

    let table = fixture.open().unwrap();
    assert!(table.set_tag(1, false));
    table.save().unwrap();

    assert!(fixture.open().unwrap().tagged_rows().is_empty());
}

#[test]
fn test_failed_save_keeps_table_usable() {
    let fixture = super_fixture(4);
    // Occupy the data dir path with a regular file
    std::fs::write(&fixture.data_dir, "blocker").unwrap();

    let table = fixture.open().unwrap();
    table.set_tag(0, true);
    let events = table.subscribe();

    let err = table.save().unwrap_err();
    assert!(matches!(err, TimelineError::PersistenceFailure(_)));
    assert!(table.is_dirty());
    assert!(table.is_tagged(0));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(table.get_cell(0, 4).as_text(), Some("event 0"));
}

#[test]
fn test_tags_keyed_by_base_name() {
    let fixture = super_fixture(4);
    let table = fixture.open().unwrap();
    table.set_tag(0, true);
    table.save().unwrap();

    // Same base name in another directory shares the overlay
    let other_dir = tempfile::tempdir().unwrap();
    let copy = other_dir.path().join("host1.csv");
    std::fs::copy(&fixture.path, &copy).unwrap();
    let other = timeline_viewer::TimelineTable::open_with(&copy, &fixture.config()).unwrap();
    assert_eq!(other.tagged_rows(), vec![0]);
}

#[test]
fn test_last_event_matches_dirty_state_under_contention() {
    let fixture = super_fixture(8);
    let table = fixture.open().unwrap();
    let events = table.subscribe();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..200 {
                table.set_tag(i % 8, i % 3 != 0);
            }
        });
        scope.spawn(|| {
            for _ in 0..50 {
                table.save().unwrap();
            }
        });
    });

    let last = events.try_iter().last().unwrap();
    match last {
        TableEvent::Saved => assert!(!table.is_dirty()),
        TableEvent::TagChanged { dirty, .. } => {
            assert!(dirty);
            assert!(table.is_dirty());
        }
    }
}
