pub mod book;
pub mod checkout;
pub mod student;

use chrono::NaiveDate;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

/// Item 모듈에서 사용할 에러 열거
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// 필수 데이터가 입력 되지 않음
    RequireArgumentMissing(String),

    /// 형식에 맞지 않는 입력값
    InvalidArgument(String),
}

impl Display for ItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::RequireArgumentMissing(field) => write!(f, "Missing required field: {}", field),
            ItemError::InvalidArgument(message) => write!(f, "Invalid argument: {}", message),
        }
    }
}

impl std::error::Error for ItemError {}

/// 레코드 정렬 기준
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SortKey {
    /// 키 오름차순 (삽입 정렬)
    #[default]
    Id,

    /// 이름 오름차순 (버블 정렬)
    Name,
}

impl TryFrom<&str> for SortKey {
    type Error = ItemError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "name" => Ok(SortKey::Name),
            _ => Err(ItemError::InvalidArgument(format!("Unknown sort key: {}", value))),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Id => write!(f, "Id"),
            SortKey::Name => write!(f, "Name"),
        }
    }
}

/// 카탈로그에 저장되는 레코드 트레이트
///
/// 레코드의 키는 배포 형태([`Record::Scheme`])에 따라 결정되며, 카탈로그 안에서 유일해야 한다.
/// 등록은 [`Record::Draft`], 수정은 [`Record::Patch`]를 통해서만 이뤄진다.
pub trait Record: Clone {
    type Key: Clone + Eq + Hash + Ord + Display + Debug;
    type Scheme: Copy + Debug;
    type Draft;
    type Patch;

    /// 입력 받은 초안을 정규화 하여 새 레코드를 만든다. `today`는 레코드의 등록일이 된다.
    fn create(draft: Self::Draft, scheme: Self::Scheme, today: NaiveDate) -> Result<Self, ItemError>;

    /// 사용자 입력 문자열을 키로 변환한다.
    fn parse_key(raw: &str, scheme: Self::Scheme) -> Result<Self::Key, ItemError>;

    fn key(&self, scheme: Self::Scheme) -> Self::Key;

    /// 저장소에서 복원한 레코드가 배포 형태에 맞는지 확인한다.
    fn check(&self, _scheme: Self::Scheme) -> Result<(), ItemError> {
        Ok(())
    }

    /// 이름순 정렬과 검색에 사용할 표시 이름
    fn name(&self) -> &str;

    /// 비어있지 않은 값만 덮어쓴다.
    fn apply(&mut self, patch: Self::Patch);
}

/// 앞뒤 공백을 제거하고 비어있으면 [`None`]을 반환한다.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 알파벳이 연속되는 구간마다 첫 글자는 대문자, 나머지는 소문자로 바꾼다.
///
/// # Example
/// ```
/// use record_desk_rust::item::title_case;
///
/// assert_eq!(title_case("  bob smith "), "Bob Smith");
/// assert_eq!(title_case("o'neil"), "O'Neil");
/// assert_eq!(title_case("COMPUTER science"), "Computer Science");
/// ```
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_cased = false;

    for ch in value.trim().chars() {
        if ch.is_alphabetic() {
            if previous_cased {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_cased = true;
        } else {
            result.push(ch);
            previous_cased = false;
        }
    }

    result
}
