use crate::item::book::{Book, Lendable};
use crate::item::checkout::{Availability, CheckoutState, Loan};
use crate::item::student::Student;
use crate::item::ItemError;
use crate::repo::PersistenceError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 스냅샷으로 저장할 수 있는 레코드
///
/// 도메인 레코드는 직접 직렬화 하지 않고 저장용 엔티티로 변환한 뒤 저장한다.
pub trait SnapshotRecord: Sized {
    /// 스냅샷 최상위 객체에서 레코드 목록이 들어갈 이름
    const COLLECTION: &'static str;

    type Entity: Serialize + DeserializeOwned;

    fn to_entity(&self) -> Self::Entity;

    fn from_entity(entity: Self::Entity) -> Result<Self, ItemError>;
}

/// 학생 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentEntity {
    pub student_id: u64,
    pub name: String,
    pub grade: String,
    pub major: String,
    pub added_date: NaiveDate,
}

impl SnapshotRecord for Student {
    const COLLECTION: &'static str = "records";

    type Entity = StudentEntity;

    fn to_entity(&self) -> StudentEntity {
        StudentEntity {
            student_id: self.student_id(),
            name: self.name().to_owned(),
            grade: self.grade().to_owned(),
            major: self.major().to_owned(),
            added_date: self.added_date(),
        }
    }

    fn from_entity(entity: StudentEntity) -> Result<Self, ItemError> {
        Student::builder()
            .student_id(entity.student_id)
            .name(&entity.name)
            .grade(&entity.grade)
            .major(&entity.major)
            .added_date(entity.added_date)
            .build()
    }
}

/// 대여 이력 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanEntity {
    pub borrower: String,
    pub checkout_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// 도서 엔티티
///
/// 대여 상태는 `available` 플래그와 `due_date`로 나뉘어 저장된다.
/// 둘 중 하나만 대여 중을 나타내는 스냅샷은 손상된 것으로 본다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntity {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub added_date: NaiveDate,
    pub available: bool,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<LoanEntity>,
    #[serde(default)]
    pub waitlist: Vec<String>,
}

impl SnapshotRecord for Book {
    const COLLECTION: &'static str = "books";

    type Entity = BookEntity;

    fn to_entity(&self) -> BookEntity {
        let circulation = self.circulation();
        BookEntity {
            isbn: self.isbn().map(str::to_owned),
            title: self.title().to_owned(),
            author: self.author().to_owned(),
            added_date: self.added_date(),
            available: circulation.is_available(),
            due_date: circulation.due_date(),
            history: circulation.history().iter()
                .map(|loan| LoanEntity {
                    borrower: loan.borrower().to_owned(),
                    checkout_date: loan.checkout_date(),
                    due_date: loan.due_date(),
                })
                .collect(),
            waitlist: circulation.waitlist().map(str::to_owned).collect(),
        }
    }

    fn from_entity(entity: BookEntity) -> Result<Self, ItemError> {
        let availability = match (entity.available, entity.due_date) {
            (true, None) => Availability::Available,
            (false, Some(due_date)) => Availability::CheckedOut { due_date },
            (available, due_date) => {
                return Err(ItemError::InvalidArgument(format!(
                    "availability ({}) and due date ({:?}) disagree for '{}'",
                    available, due_date, entity.title
                )));
            }
        };
        let history = entity.history.iter()
            .map(|loan| Loan::new(&loan.borrower, loan.checkout_date, loan.due_date))
            .collect();

        let mut builder = Book::builder()
            .title(&entity.title)
            .author(&entity.author)
            .added_date(entity.added_date)
            .circulation(CheckoutState::restore(availability, entity.waitlist, history));
        if let Some(isbn) = &entity.isbn {
            builder = builder.isbn(isbn);
        }

        builder.build()
    }
}

/// 레코드들을 `{ "<collection>": [...] }` 형태의 JSON으로 변환한다.
pub fn encode<'a, R, I>(records: I) -> Result<String, PersistenceError>
where
    R: SnapshotRecord + 'a,
    I: IntoIterator<Item = &'a R>
{
    let entities = records.into_iter()
        .map(|record| serde_json::to_value(record.to_entity()))
        .collect::<Result<Vec<Value>, _>>()?;

    let mut root = Map::new();
    root.insert(R::COLLECTION.to_owned(), Value::Array(entities));

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

/// 스냅샷 JSON을 레코드 목록으로 변환한다. 목록이 없는 객체는 빈 스냅샷으로 취급한다.
pub fn decode<R>(contents: &str) -> Result<Vec<R>, PersistenceError>
where
    R: SnapshotRecord
{
    let root: Value = serde_json::from_str(contents)
        .map_err(|e| PersistenceError::Corrupt(e.to_string()))?;

    let mut root = match root {
        Value::Object(map) => map,
        other => return Err(PersistenceError::Corrupt(format!("expected an object at the top level, found {}", kind_of(&other)))),
    };

    let Some(collection) = root.remove(R::COLLECTION) else {
        return Ok(Vec::new());
    };

    let entities: Vec<R::Entity> = serde_json::from_value(collection)
        .map_err(|e| PersistenceError::Corrupt(format!("'{}': {}", R::COLLECTION, e)))?;

    entities.into_iter()
        .map(|entity| R::from_entity(entity).map_err(|e| PersistenceError::Corrupt(e.to_string())))
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
