//! Multiple open timelines: cross-table search, titles and saving.

use crate::helpers::{FILESYSTEM_HEADER, SUPER_HEADER, TimelineFixture, fs_row, super_row};
use tempfile::tempdir;
use timeline_viewer::{FilterColumn, RowFilter, TableConfig, Workspace};

#[test]
fn test_failed_open_adds_nothing() {
    let dir = tempdir().unwrap();
    let mut workspace = Workspace::new(TableConfig::with_data_dir(dir.path()));

    assert!(workspace.open(dir.path().join("missing.csv")).is_err());
    assert!(workspace.is_empty());
    assert_eq!(workspace.title(0), "Linux Timeline Viewer");
}

#[test]
fn test_search_all_reports_first_match() {
    let data = tempdir().unwrap();
    let fs = TimelineFixture::new("disk.csv")
        .header(FILESYSTEM_HEADER)
        .rows([fs_row("/a"), fs_row("/b")])
        .build();
    let sup = TimelineFixture::new("super.csv")
        .header(SUPER_HEADER)
        .rows([super_row("nothing"), super_row("mimikatz.exe launched")])
        .build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(data.path()));
    assert_eq!(workspace.open(&fs.path).unwrap(), 0);
    assert_eq!(workspace.open(&sup.path).unwrap(), 1);

    let report = workspace.search_all(&RowFilter::any_column("MIMIKATZ"));
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].is_empty());
    assert_eq!(report.outcomes[1].rows, vec![1]);
    assert_eq!(report.first_match, Some(1));
    assert_eq!(report.tables_matched(), 1);

    let none = workspace.search_all(&RowFilter::any_column("absent"));
    assert_eq!(none.first_match, None);
    assert_eq!(none.tables_matched(), 0);
}

#[test]
fn test_named_column_search_across_schemas() {
    let data = tempdir().unwrap();
    let fs = TimelineFixture::new("disk.csv")
        .header(FILESYSTEM_HEADER)
        .row(fs_row("/message"))
        .build();
    let sup = TimelineFixture::new("super.csv")
        .header(SUPER_HEADER)
        .row(super_row("message body"))
        .build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(data.path()));
    workspace.open(&fs.path).unwrap();
    workspace.open(&sup.path).unwrap();

    // Filesystem timelines have no "message" column
    let filter = RowFilter::new(FilterColumn::parse("message"), "message");
    let report = workspace.search_all(&filter);
    assert!(report.outcomes[0].is_empty());
    assert_eq!(report.outcomes[1].rows, vec![0]);
}

#[test]
fn test_column_union_is_sorted_and_unique() {
    let data = tempdir().unwrap();
    let a = TimelineFixture::new("a.csv").header("b,a, c ,").row("1,2,3,4").build();
    let b = TimelineFixture::new("b.csv").header("a,d").row("1,2").build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(data.path()));
    workspace.open(&a.path).unwrap();
    workspace.open(&b.path).unwrap();

    assert_eq!(workspace.column_union(), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_title_and_save_all() {
    let data = tempdir().unwrap();
    let first = TimelineFixture::new("first.csv")
        .header(SUPER_HEADER)
        .row(super_row("x"))
        .build();
    let second = TimelineFixture::new("second.csv")
        .header(SUPER_HEADER)
        .row(super_row("y"))
        .build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(data.path()));
    workspace.open(&first.path).unwrap();
    workspace.open(&second.path).unwrap();
    assert_eq!(workspace.title(0), "Linux Timeline Viewer - first.csv");

    workspace.get(1).unwrap().set_tag(0, true);
    assert_eq!(workspace.title(1), "Linux Timeline Viewer - second.csv *");
    assert_eq!(workspace.unsaved(), vec![1]);

    assert!(workspace.save_all().is_empty());
    assert!(workspace.unsaved().is_empty());
    assert_eq!(workspace.title(1), "Linux Timeline Viewer - second.csv");
    assert!(data.path().join("second.tags").is_file());
    assert!(!data.path().join("first.tags").exists());
}

#[test]
fn test_save_all_collects_failures() {
    let dir = tempdir().unwrap();
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, "").unwrap();
    let fixture = TimelineFixture::new("t.csv")
        .header(SUPER_HEADER)
        .row(super_row("x"))
        .build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(&blocked));
    workspace.open(&fixture.path).unwrap();
    workspace.get(0).unwrap().set_tag(0, true);

    let failures = workspace.save_all();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, fixture.path);
    assert_eq!(workspace.unsaved(), vec![0]);
}

#[test]
fn test_close_removes_table() {
    let data = tempdir().unwrap();
    let fixture = TimelineFixture::new("t.csv").header("a").row("1").build();

    let mut workspace = Workspace::new(TableConfig::with_data_dir(data.path()));
    workspace.open(&fixture.path).unwrap();
    assert!(workspace.close(5).is_none());
    let closed = workspace.close(0).unwrap();
    assert_eq!(closed.file_name(), "t.csv");
    assert!(workspace.is_empty());
}
