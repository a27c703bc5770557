use crate::catalog::CatalogError;
use crate::item::book::{Book, BookDraft, BookPatch, KeyScheme, TextKey};
use crate::item::checkout::CheckoutOutcome;
use crate::item::student::{Student, StudentDraft, StudentPatch};
use crate::item::{Record, SortKey};
use crate::ledger::{ActivityLog, Ledger};
use crate::repo::{SnapshotRecord, SnapshotStore};
use crate::shell::{Command, Console, ShellError};
use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};

const STUDENT_HELP: &str = "\
Commands:
  add                 register a new student
  update [id]         change a student's name, grade or major
  delete [id]         remove a student
  search [term]       find students by id or name
  display [id|name]   list all students sorted by id (default) or name
  list                list all students in the current order
  export [path]       write a report of every student
  help                show this message
  exit                save and quit";

const LIBRARY_HELP: &str = "\
Commands:
  add                 register a new book
  update [key]        change a book's title or author
  delete [key]        remove a book
  search [term]       find books by key or title
  display [id|name]   list all books sorted by key (default) or title
  list                list every book with its status and waitlist
  borrow [key]        lend a book or join its waitlist (alias: checkout)
  return [key]        return a book and notify the next borrower
  export [path]       write a report of every book
  help                show this message
  exit                save and quit";

/// 실행 모드마다 명령을 처리하는 창구
pub trait Desk {
    fn banner(&self) -> String;

    /// `exit`을 제외한 명령을 처리한다.
    fn execute(&mut self, command: Command, console: &mut Console) -> Result<(), ShellError>;

    /// 전체 스냅샷을 저장하고 저장된 레코드 수를 반환한다.
    fn save(&mut self) -> Result<usize, ShellError>;
}

/// 학생 기록 창구
pub struct StudentDesk<S, L> {
    ledger: Ledger<Student, S, L>,
    export_path: String,
}

impl<S: SnapshotStore, L: ActivityLog> StudentDesk<S, L> {
    pub fn new(ledger: Ledger<Student, S, L>, export_path: &str) -> Self {
        Self {
            ledger,
            export_path: export_path.to_owned(),
        }
    }

    pub fn ledger(&self) -> &Ledger<Student, S, L> {
        &self.ledger
    }

    fn add(&mut self, console: &mut Console) -> Result<(), ShellError> {
        let student_id = ask_unused_key(&self.ledger, console, "Student ID: ", "Student ID")?;
        let name = console.ask_required("Name: ", "Name")?;
        let grade = console.ask("Grade: ")?;
        let major = console.ask("Major (blank for Undeclared): ")?;

        let key = self.ledger.add(StudentDraft { student_id, name, grade, major })?;
        announce(&self.ledger, &key, "Added", console)
    }

    fn update(&mut self, raw: Option<String>, console: &mut Console) -> Result<(), ShellError> {
        let key = key_of(&self.ledger, raw, "Student ID to update: ", console)?;
        let current = self.ledger.find(&key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;

        let name_prompt = format!("Name [{}] (press Enter to keep): ", current.name());
        let grade_prompt = format!("Grade [{}] (press Enter to keep): ", current.grade());
        let major_prompt = format!("Major [{}] (press Enter to keep): ", current.major());

        let patch = StudentPatch {
            name: Some(console.ask(&name_prompt)?),
            grade: Some(console.ask(&grade_prompt)?),
            major: Some(console.ask(&major_prompt)?),
        };
        let key = self.ledger.update(&key, patch)?;
        announce(&self.ledger, &key, "Updated", console)
    }
}

impl<S: SnapshotStore, L: ActivityLog> Desk for StudentDesk<S, L> {
    fn banner(&self) -> String {
        "Student Record Management System".to_owned()
    }

    fn execute(&mut self, command: Command, console: &mut Console) -> Result<(), ShellError> {
        match command {
            Command::Add => self.add(console),
            Command::Update(raw) => self.update(raw, console),
            Command::Delete(raw) => delete(&mut self.ledger, raw, "Student ID to delete: ", console),
            Command::Search(term) => search(&self.ledger, term, console),
            Command::Display(criterion) => display(&mut self.ledger, criterion, console),
            Command::List => list(&self.ledger, console),
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                export(&mut self.ledger, &path, "Student Record Export", console)
            }
            Command::Borrow(_) | Command::Return(_) => {
                console.say("Borrowing and returning are not supported for student records.")?;
                Ok(())
            }
            Command::Help => Ok(console.say(STUDENT_HELP)?),
            Command::Exit => Ok(()),
        }
    }

    fn save(&mut self) -> Result<usize, ShellError> {
        self.ledger.save()?;
        Ok(self.ledger.len())
    }
}

/// 도서관 창구
pub struct LibraryDesk<S, L> {
    ledger: Ledger<Book, S, L>,
    export_path: String,
    loan_days: u32,
}

impl<S: SnapshotStore, L: ActivityLog> LibraryDesk<S, L> {
    pub fn new(ledger: Ledger<Book, S, L>, export_path: &str, loan_days: u32) -> Self {
        Self {
            ledger,
            export_path: export_path.to_owned(),
            loan_days,
        }
    }

    pub fn ledger(&self) -> &Ledger<Book, S, L> {
        &self.ledger
    }

    fn key_question(&self, action: &str) -> String {
        format!("{} of the book to {}: ", self.ledger.scheme(), action)
    }

    fn title_of(&self, key: &TextKey) -> String {
        self.ledger.find(key)
            .map(|book| book.title().to_owned())
            .unwrap_or_else(|| key.to_string())
    }

    fn add(&mut self, console: &mut Console) -> Result<(), ShellError> {
        let (isbn, title) = match self.ledger.scheme() {
            KeyScheme::Isbn => {
                let isbn = ask_unused_key(&self.ledger, console, "ISBN: ", "ISBN")?;
                (isbn, console.ask_required("Title: ", "Title")?)
            }
            KeyScheme::Title => {
                let isbn = console.ask("ISBN (optional): ")?;
                (isbn, ask_unused_key(&self.ledger, console, "Title: ", "Title")?)
            }
        };
        let author = console.ask("Author: ")?;

        let key = self.ledger.add(BookDraft { isbn, title, author })?;
        announce(&self.ledger, &key, "Added", console)
    }

    fn update(&mut self, raw: Option<String>, console: &mut Console) -> Result<(), ShellError> {
        let question = self.key_question("update");
        let key = key_of(&self.ledger, raw, &question, console)?;
        let current = self.ledger.find(&key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;

        let title_prompt = format!("Title [{}] (press Enter to keep): ", current.title());
        let author_prompt = format!("Author [{}] (press Enter to keep): ", current.author());

        let patch = BookPatch {
            title: Some(console.ask(&title_prompt)?),
            author: Some(console.ask(&author_prompt)?),
        };
        let key = self.ledger.update(&key, patch)?;
        announce(&self.ledger, &key, "Updated", console)
    }

    fn borrow(&mut self, raw: Option<String>, console: &mut Console) -> Result<(), ShellError> {
        let question = self.key_question("borrow");
        let key = key_of(&self.ledger, raw, &question, console)?;
        if self.ledger.find(&key).is_none() {
            return Err(CatalogError::NotFound(key.to_string()).into());
        }
        let borrower = console.ask_required("Borrower ID: ", "Borrower ID")?;

        let outcome = self.ledger.checkout(&key, &borrower, self.loan_days)?;
        let title = self.title_of(&key);
        let message = match outcome {
            CheckoutOutcome::Lent { due_date } =>
                format!("'{}' checked out to {}. Due back on {}.", title, borrower, due_date.format("%Y-%m-%d")),
            CheckoutOutcome::Queued { position } =>
                format!("'{}' is checked out. {} joined the waitlist at position {}.", title, borrower, position),
            CheckoutOutcome::AlreadyQueued { position } =>
                format!("{} is already on the waitlist for '{}' at position {}.", borrower, title, position),
            CheckoutOutcome::AlreadyHolding { due_date } =>
                format!("{} already has '{}'. Due back on {}.", borrower, title, due_date.format("%Y-%m-%d")),
        };
        Ok(console.say(message)?)
    }

    fn return_book(&mut self, raw: Option<String>, console: &mut Console) -> Result<(), ShellError> {
        let question = self.key_question("return");
        let key = key_of(&self.ledger, raw, &question, console)?;

        let receipt = self.ledger.return_item(&key)?;
        let title = self.title_of(&key);
        if receipt.was_late() {
            console.say(format!("'{}' returned {} day(s) late.", title, receipt.late_days()))?;
        } else {
            console.say(format!("'{}' returned on time.", title))?;
        }
        if let Some(next) = receipt.promoted() {
            console.say(format!("Notify {}: '{}' is now available for them.", next, title))?;
        }
        Ok(())
    }
}

impl<S: SnapshotStore, L: ActivityLog> Desk for LibraryDesk<S, L> {
    fn banner(&self) -> String {
        format!("Library Management System (books keyed by {})", self.ledger.scheme())
    }

    fn execute(&mut self, command: Command, console: &mut Console) -> Result<(), ShellError> {
        match command {
            Command::Add => self.add(console),
            Command::Update(raw) => self.update(raw, console),
            Command::Delete(raw) => {
                let question = self.key_question("delete");
                delete(&mut self.ledger, raw, &question, console)
            }
            Command::Search(term) => search(&self.ledger, term, console),
            Command::Display(criterion) => display(&mut self.ledger, criterion, console),
            Command::List => list(&self.ledger, console),
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| self.export_path.clone());
                export(&mut self.ledger, &path, "Library Book Export", console)
            }
            Command::Borrow(raw) => self.borrow(raw, console),
            Command::Return(raw) => self.return_book(raw, console),
            Command::Help => Ok(console.say(LIBRARY_HELP)?),
            Command::Exit => Ok(()),
        }
    }

    fn save(&mut self) -> Result<usize, ShellError> {
        self.ledger.save()?;
        Ok(self.ledger.len())
    }
}

fn key_of<R, S, L>(ledger: &Ledger<R, S, L>, raw: Option<String>, question: &str, console: &mut Console) -> Result<R::Key, ShellError>
where
    R: Record + SnapshotRecord,
    S: SnapshotStore,
    L: ActivityLog
{
    let raw = match raw {
        Some(raw) => raw,
        None => console.ask(question)?,
    };
    Ok(ledger.parse_key(&raw)?)
}

/// 형식에 맞고 아직 쓰이지 않은 키를 입력 받을 때까지 다시 묻는다.
fn ask_unused_key<R, S, L>(ledger: &Ledger<R, S, L>, console: &mut Console, question: &str, field: &str) -> Result<String, ShellError>
where
    R: Record + SnapshotRecord,
    S: SnapshotStore,
    L: ActivityLog
{
    loop {
        let raw = console.ask_required(question, field)?;
        match ledger.parse_key(&raw) {
            Ok(key) if ledger.find(&key).is_some() => console.say(format!("{} {} already exists.", field, raw))?,
            Ok(_) => return Ok(raw),
            Err(e) => console.say(e)?,
        }
    }
}

fn announce<R, S, L>(ledger: &Ledger<R, S, L>, key: &R::Key, action: &str, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    if let Some(record) = ledger.find(key) {
        console.say(format!("{}: {}", action, record))?;
    }
    Ok(())
}

fn delete<R, S, L>(ledger: &mut Ledger<R, S, L>, raw: Option<String>, question: &str, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    let key = key_of(ledger, raw, question, console)?;
    let removed = ledger.delete(&key)?;
    Ok(console.say(format!("Deleted: {}", removed))?)
}

fn search<R, S, L>(ledger: &Ledger<R, S, L>, term: Option<String>, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    let term = match term {
        Some(term) => term,
        None => console.ask("Search term: ")?,
    };

    let mut count = 0;
    for record in ledger.search(&term) {
        console.say(record)?;
        count += 1;
    }

    if count == 0 {
        console.say(format!("No records match '{}'.", term))?;
    } else {
        console.say(format!("{} record(s) found.", count))?;
    }
    Ok(())
}

fn display<R, S, L>(ledger: &mut Ledger<R, S, L>, criterion: SortKey, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    if ledger.is_empty() {
        return Ok(console.say("No records to display.")?);
    }

    let mut count = 0;
    for record in ledger.sorted_view(criterion) {
        console.say(record)?;
        count += 1;
    }
    Ok(console.say(format!("{} record(s), sorted by {}.", count, criterion))?)
}

fn list<R, S, L>(ledger: &Ledger<R, S, L>, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    for record in ledger.records() {
        console.say(record)?;
    }
    Ok(console.say(format!("{} record(s).", ledger.len()))?)
}

fn export<R, S, L>(ledger: &mut Ledger<R, S, L>, path: &str, heading: &str, console: &mut Console) -> Result<(), ShellError>
where
    R: Record + SnapshotRecord + Display,
    S: SnapshotStore,
    L: ActivityLog
{
    if ledger.is_empty() {
        return Ok(console.say("No records to export.")?);
    }

    let to_error = |source: io::Error| ShellError::Export { path: path.to_owned(), source };

    let mut writer = BufWriter::new(File::create(path).map_err(to_error)?);
    let count = ledger.export_to(&mut writer, heading).map_err(to_error)?;
    writer.flush().map_err(to_error)?;

    Ok(console.say(format!("Exported {} record(s) to {}.", count, path))?)
}
