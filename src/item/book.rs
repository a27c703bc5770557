use crate::item::checkout::CheckoutState;
use crate::item::{ItemError, Record, non_blank, title_case};
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

static ISBN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9][0-9-]*[0-9Xx]?$").unwrap());

const UNKNOWN_AUTHOR: &str = "Unknown";

/// 도서 카탈로그의 키 종류
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum KeyScheme {
    Isbn,
    Title,
}

impl Display for KeyScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            KeyScheme::Isbn => write!(f, "ISBN"),
            KeyScheme::Title => write!(f, "Title"),
        }
    }
}

/// 대소문자를 구분하지 않는 문자열 키
///
/// 앞뒤 공백을 제거한 뒤 소문자로 저장하기 때문에 비교, 해시, 정렬 모두 대소문자를 무시한다.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextKey(String);

impl TextKey {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TextKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 도서
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Book {
    isbn: Option<String>,
    title: String,
    author: String,
    added_date: NaiveDate,
    circulation: CheckoutState,
}

impl Book {
    pub fn builder() -> BookBuilder {
        BookBuilder::new()
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn added_date(&self) -> NaiveDate {
        self.added_date
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = match self.circulation.due_date() {
            None => "Available".to_owned(),
            Some(due_date) => format!("Due {}", due_date.format("%Y-%m-%d")),
        };

        write!(
            f,
            "ISBN: {:14} | Title: {:30} | Author: {:20} | Status: {:14} | Waitlist: {}",
            self.isbn.as_deref().unwrap_or("-"),
            self.title,
            self.author,
            status,
            self.circulation.waitlist().len()
        )
    }
}

/// Book 빌더
#[derive(Debug, Clone, Default)]
pub struct BookBuilder {
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    added_date: Option<NaiveDate>,
    circulation: Option<CheckoutState>,
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isbn(mut self, isbn: &str) -> Self {
        self.isbn = Some(isbn.to_owned());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_owned());
        self
    }

    pub fn added_date(mut self, added_date: NaiveDate) -> Self {
        self.added_date = Some(added_date);
        self
    }

    pub fn circulation(mut self, circulation: CheckoutState) -> Self {
        self.circulation = Some(circulation);
        self
    }

    pub fn build(self) -> Result<Book, ItemError> {
        let isbn = non_blank(self.isbn.as_deref())
            .map(validate_isbn)
            .transpose()?;
        let title = non_blank(self.title.as_deref())
            .map(title_case)
            .ok_or(ItemError::RequireArgumentMissing("title".to_owned()))?;
        let added_date = self.added_date
            .ok_or(ItemError::RequireArgumentMissing("added_date".to_owned()))?;
        let author = non_blank(self.author.as_deref())
            .map(title_case)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned());

        Ok(Book {
            isbn,
            title,
            author,
            added_date,
            circulation: self.circulation.unwrap_or_default(),
        })
    }
}

/// 도서 등록 입력값
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub isbn: String,
    pub title: String,
    pub author: String,
}

/// 도서 수정 입력값으로 비어있는 항목은 기존 값을 유지한다. ISBN은 수정할 수 없다.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
}

fn validate_isbn(raw: &str) -> Result<String, ItemError> {
    if ISBN.is_match(raw) {
        Ok(raw.to_owned())
    } else {
        Err(ItemError::InvalidArgument(format!("ISBN may only contain digits, '-' and a trailing 'X': {}", raw)))
    }
}

impl Record for Book {
    type Key = TextKey;
    type Scheme = KeyScheme;
    type Draft = BookDraft;
    type Patch = BookPatch;

    fn create(draft: BookDraft, scheme: KeyScheme, today: NaiveDate) -> Result<Self, ItemError> {
        if scheme == KeyScheme::Isbn && non_blank(Some(&draft.isbn)).is_none() {
            return Err(ItemError::RequireArgumentMissing("isbn".to_owned()));
        }

        Book::builder()
            .isbn(&draft.isbn)
            .title(&draft.title)
            .author(&draft.author)
            .added_date(today)
            .build()
    }

    fn parse_key(raw: &str, scheme: KeyScheme) -> Result<TextKey, ItemError> {
        match non_blank(Some(raw)) {
            Some(raw) => Ok(TextKey::new(raw)),
            None => Err(ItemError::RequireArgumentMissing(scheme.to_string().to_lowercase())),
        }
    }

    fn key(&self, scheme: KeyScheme) -> TextKey {
        match scheme {
            KeyScheme::Isbn => TextKey::new(self.isbn.as_deref().unwrap_or_default()),
            KeyScheme::Title => TextKey::new(&self.title),
        }
    }

    fn check(&self, scheme: KeyScheme) -> Result<(), ItemError> {
        if scheme == KeyScheme::Isbn && self.isbn.is_none() {
            return Err(ItemError::RequireArgumentMissing("isbn".to_owned()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = non_blank(patch.title.as_deref()) {
            self.title = title_case(title);
        }
        if let Some(author) = non_blank(patch.author.as_deref()) {
            self.author = title_case(author);
        }
    }
}

/// 대여와 반납이 가능한 레코드
pub trait Lendable: Record {
    fn circulation(&self) -> &CheckoutState;

    fn circulation_mut(&mut self) -> &mut CheckoutState;
}

impl Lendable for Book {
    fn circulation(&self) -> &CheckoutState {
        &self.circulation
    }

    fn circulation_mut(&mut self) -> &mut CheckoutState {
        &mut self.circulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn draft(isbn: &str, title: &str, author: &str) -> BookDraft {
        BookDraft {
            isbn: isbn.to_owned(),
            title: title.to_owned(),
            author: author.to_owned(),
        }
    }

    #[test]
    fn create_normalizes_title_and_author() {
        let book = Book::create(draft("123", "dune", "frank HERBERT"), KeyScheme::Isbn, today()).unwrap();

        assert_eq!(book.isbn(), Some("123"));
        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
        assert!(book.circulation().is_available());
    }

    #[test]
    fn isbn_is_required_only_for_isbn_scheme() {
        assert_eq!(
            Book::create(draft(" ", "dune", "herbert"), KeyScheme::Isbn, today()),
            Err(ItemError::RequireArgumentMissing("isbn".to_owned()))
        );

        let book = Book::create(draft("", "dune", "herbert"), KeyScheme::Title, today()).unwrap();
        assert_eq!(book.isbn(), None);
    }

    #[test]
    fn malformed_isbn_is_rejected() {
        assert!(matches!(
            Book::create(draft("12ab", "dune", "herbert"), KeyScheme::Isbn, today()),
            Err(ItemError::InvalidArgument(_))
        ));
        assert!(Book::create(draft("0-306-40615-X", "dune", ""), KeyScheme::Isbn, today()).is_ok());
    }

    #[test]
    fn key_is_case_insensitive() {
        let book = Book::create(draft("123", "the hobbit", "tolkien"), KeyScheme::Title, today()).unwrap();

        assert_eq!(book.key(KeyScheme::Title), Book::parse_key("  THE HOBBIT ", KeyScheme::Title).unwrap());
        assert_eq!(book.key(KeyScheme::Isbn), TextKey::new("123"));
    }

    #[test]
    fn apply_merges_on_blank() {
        let mut book = Book::create(draft("123", "dune", "herbert"), KeyScheme::Isbn, today()).unwrap();

        book.apply(BookPatch {
            title: Some("  ".to_owned()),
            author: Some("frank herbert".to_owned()),
        });

        assert_eq!(book.title(), "Dune");
        assert_eq!(book.author(), "Frank Herbert");
    }
}
