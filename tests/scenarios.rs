use chrono::NaiveDate;
use record_desk_rust::catalog::CatalogError;
use record_desk_rust::clock::FixedClock;
use record_desk_rust::item::book::{Book, BookDraft, BookPatch, KeyScheme, Lendable, TextKey};
use record_desk_rust::item::checkout::CheckoutOutcome;
use record_desk_rust::item::student::{Student, StudentDraft};
use record_desk_rust::item::SortKey;
use record_desk_rust::ledger::{Activity, Ledger, LoadReport, MemoryActivityLog};
use record_desk_rust::repo::{JsonFileStore, SnapshotStore};
use record_desk_rust::shell::Console;
use record_desk_rust::{run_desk, Settings, Variant};
use std::io::Cursor;
use std::path::Path;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn open_students(path: &Path, today: NaiveDate) -> (Ledger<Student, JsonFileStore, MemoryActivityLog>, LoadReport) {
    Ledger::open((), JsonFileStore::new(path), MemoryActivityLog::new(), Box::new(FixedClock(today)))
}

fn open_books(path: &Path, scheme: KeyScheme, today: NaiveDate) -> (Ledger<Book, JsonFileStore, MemoryActivityLog>, LoadReport) {
    Ledger::open(scheme, JsonFileStore::new(path), MemoryActivityLog::new(), Box::new(FixedClock(today)))
}

fn student(id: &str, name: &str) -> StudentDraft {
    StudentDraft {
        student_id: id.to_owned(),
        name: name.to_owned(),
        grade: "a".to_owned(),
        major: "".to_owned(),
    }
}

#[test]
fn students_sort_by_id_and_name_and_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("student_records.dat");

    let (mut ledger, report) = open_students(&path, day(1));
    assert_eq!(report, LoadReport::Fresh);

    ledger.add(student("2", "bob smith")).unwrap();
    ledger.add(student("1", "ann lee")).unwrap();

    let by_id: Vec<u64> = ledger.sorted_view(SortKey::Id).map(Student::student_id).collect();
    assert_eq!(by_id, vec![1, 2]);
    let by_name: Vec<&str> = ledger.sorted_view(SortKey::Name).map(Student::name).collect();
    assert_eq!(by_name, vec!["Ann Lee", "Bob Smith"]);

    let (reloaded, report) = open_students(&path, day(9));
    assert_eq!(report, LoadReport::Loaded(2));

    let ann = reloaded.find(&1).unwrap();
    assert_eq!(ann.name(), "Ann Lee");
    assert_eq!(ann.major(), "Undeclared");
    assert_eq!(ann.added_date(), day(1));
}

#[test]
fn deleting_an_unknown_record_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students.dat");

    let (mut ledger, _) = open_students(&path, day(1));
    ledger.add(student("1", "ann lee")).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    assert!(matches!(ledger.delete(&42), Err(CatalogError::NotFound(_))));

    assert_eq!(ledger.len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn book_checkout_waitlist_and_return() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library_isbn.json");

    let (mut ledger, _) = open_books(&path, KeyScheme::Isbn, day(1));
    let key = ledger.add(BookDraft {
        isbn: "123".to_owned(),
        title: "dune".to_owned(),
        author: "herbert".to_owned(),
    }).unwrap();

    assert_eq!(ledger.checkout(&key, "m1", 14).unwrap(), CheckoutOutcome::Lent { due_date: day(15) });
    assert_eq!(ledger.checkout(&key, "m2", 14).unwrap(), CheckoutOutcome::Queued { position: 1 });

    // 저장된 파일에서 다시 읽어도 대여 상태와 대기열이 유지 되어야 한다.
    let (mut ledger, report) = open_books(&path, KeyScheme::Isbn, day(20));
    assert_eq!(report, LoadReport::Loaded(1));
    let book = ledger.find(&key).unwrap();
    assert_eq!(book.circulation().due_date(), Some(day(15)));
    assert_eq!(book.circulation().waitlist().collect::<Vec<_>>(), vec!["m2"]);
    assert_eq!(book.circulation().history().len(), 1);

    let receipt = ledger.return_item(&key).unwrap();
    assert_eq!(receipt.promoted(), Some("m2"));
    assert_eq!(receipt.late_days(), 5);

    let book = ledger.find(&key).unwrap();
    assert!(book.circulation().is_available());
    assert_eq!(book.circulation().waitlist().count(), 0);
    assert!(matches!(
        ledger.log().entries().last(),
        Some(Activity::Saved { count: 1, .. })
    ));
}

#[test]
fn title_keyed_update_collision_leaves_catalog_intact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library_titles.json");

    let (mut ledger, _) = open_books(&path, KeyScheme::Title, day(1));
    for title in ["dune", "emma"] {
        ledger.add(BookDraft { title: title.to_owned(), ..BookDraft::default() }).unwrap();
    }

    let result = ledger.update(&TextKey::new("emma"), BookPatch {
        title: Some("DUNE".to_owned()),
        author: None,
    });

    assert!(matches!(result, Err(CatalogError::DuplicateKey(_))));
    assert_eq!(ledger.find(&TextKey::new("Emma")).unwrap().title(), "Emma");
    assert_eq!(ledger.len(), 2);
}

#[test]
fn corrupt_snapshot_starts_empty_and_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library_isbn.json");
    std::fs::write(&path, r#"{"books": [{"isbn": "1", "title": "x"}]}"#).unwrap();

    let (ledger, report) = open_books(&path, KeyScheme::Isbn, day(1));

    assert!(matches!(report, LoadReport::Corrupt(_)));
    assert!(ledger.is_empty());
    assert!(matches!(ledger.log().entries(), [Activity::LoadFailed { .. }]));
}

#[test]
fn scripted_session_persists_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("books.json");
    let settings = Settings {
        variant: Variant::LibraryTitle,
        data_path: data_path.display().to_string(),
        export_path: dir.path().join("books.txt").display().to_string(),
        loan_days: 7,
    };

    let mut input = Cursor::new(b"add\n\nthe left hand of darkness\nle guin\nborrow the LEFT hand of darkness\nm1\nexport\n".to_vec());
    let mut output = Vec::new();
    {
        let mut console = Console::new(&mut input, &mut output);
        run_desk(&settings, &mut console).unwrap();
    }
    let output = String::from_utf8(output).unwrap();

    assert!(output.starts_with("No saved records at"));
    assert!(output.contains("'The Left Hand Of Darkness' checked out to m1."));
    assert!(output.contains("Exported 1 record(s)"));

    let snapshot = JsonFileStore::new(&data_path).load_snapshot().unwrap().unwrap();
    assert!(snapshot.contains("\"available\": false"));
    assert!(snapshot.contains("\"borrower\": \"m1\""));
}
