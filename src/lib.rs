use crate::clock::SystemClock;
use crate::item::book::KeyScheme;
use crate::ledger::{Ledger, LoadReport, TracingActivityLog};
use crate::repo::JsonFileStore;
use crate::shell::{Console, LibraryDesk, ShellError, StudentDesk};
use std::fmt;
use std::fmt::Formatter;

pub mod catalog;
pub mod clock;
pub mod configs;
pub mod item;
pub mod ledger;
pub mod repo;
pub mod shell;

/// 실행 모드
#[derive(Debug, Copy, Clone, Eq, PartialEq, clap::ValueEnum)]
pub enum Variant {
    /// 학번으로 구분하는 학생 기록
    Student,

    /// ISBN으로 구분하는 도서관
    LibraryIsbn,

    /// 제목으로 구분하는 도서관
    LibraryTitle,
}

impl Variant {
    pub fn default_snapshot_path(&self) -> &'static str {
        match self {
            Variant::Student => "student_records.dat",
            Variant::LibraryIsbn => "library_isbn.json",
            Variant::LibraryTitle => "library_titles.json",
        }
    }

    pub fn default_export_path(&self) -> &'static str {
        match self {
            Variant::Student => "student_records.txt",
            Variant::LibraryIsbn | Variant::LibraryTitle => "library_books.txt",
        }
    }

    /// 도서관 모드의 키 구분 방식으로, 학생 모드는 `None`이다.
    pub fn key_scheme(&self) -> Option<KeyScheme> {
        match self {
            Variant::Student => None,
            Variant::LibraryIsbn => Some(KeyScheme::Isbn),
            Variant::LibraryTitle => Some(KeyScheme::Title),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Student => write!(f, "student"),
            Variant::LibraryIsbn => write!(f, "library-isbn"),
            Variant::LibraryTitle => write!(f, "library-title"),
        }
    }
}

/// 설정 파일과 명령행 인자를 합친 실행 옵션
#[derive(Debug, Clone)]
pub struct Settings {
    pub variant: Variant,
    pub data_path: String,
    pub export_path: String,
    pub loan_days: u32,
}

/// 스냅샷 파일로 레저를 열고 명령 루프를 실행한다.
pub fn run_desk(settings: &Settings, console: &mut Console) -> Result<(), ShellError> {
    let store = JsonFileStore::new(&settings.data_path);

    match settings.variant.key_scheme() {
        None => {
            let (ledger, report) = Ledger::open((), store, TracingActivityLog, Box::new(SystemClock));
            console.say(describe_load(&report, &settings.data_path))?;

            let mut desk = StudentDesk::new(ledger, &settings.export_path);
            shell::run(&mut desk, console)
        }
        Some(scheme) => {
            let (ledger, report) = Ledger::open(scheme, store, TracingActivityLog, Box::new(SystemClock));
            console.say(describe_load(&report, &settings.data_path))?;

            let mut desk = LibraryDesk::new(ledger, &settings.export_path, settings.loan_days);
            shell::run(&mut desk, console)
        }
    }
}

fn describe_load(report: &LoadReport, path: &str) -> String {
    match report {
        LoadReport::Fresh => format!("No saved records at {}. Starting fresh.", path),
        LoadReport::Loaded(count) => format!("Loaded {} record(s) from {}.", count, path),
        LoadReport::Corrupt(reason) =>
            format!("Warning: {} is corrupt ({}). Starting with an empty catalog.", path, reason),
        LoadReport::Unreadable(reason) =>
            format!("Warning: could not read {} ({}). Starting with an empty catalog.", path, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn variant_names_match_command_line_values() {
        for variant in Variant::value_variants() {
            let parsed = Variant::from_str(&variant.to_string(), false).unwrap();
            assert_eq!(parsed, *variant);
        }
        assert!(Variant::from_str("library", false).is_err());
    }

    #[test]
    fn default_paths_follow_variant() {
        assert_eq!(Variant::Student.default_snapshot_path(), "student_records.dat");
        assert_eq!(Variant::LibraryTitle.default_snapshot_path(), "library_titles.json");
        assert_eq!(Variant::LibraryIsbn.default_export_path(), "library_books.txt");
        assert_eq!(Variant::LibraryIsbn.key_scheme(), Some(KeyScheme::Isbn));
        assert_eq!(Variant::Student.key_scheme(), None);
    }

    #[test]
    fn load_reports_are_described_distinctly() {
        assert!(describe_load(&LoadReport::Fresh, "a.json").starts_with("No saved records"));
        assert!(describe_load(&LoadReport::Loaded(3), "a.json").contains("3 record(s)"));
        assert!(describe_load(&LoadReport::Corrupt("bad".into()), "a.json").contains("is corrupt (bad)"));
        assert!(describe_load(&LoadReport::Unreadable("denied".into()), "a.json").contains("could not read"));
    }
}
