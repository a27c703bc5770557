use crate::item::{ItemError, Record, non_blank, title_case};
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

static STUDENT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

const UNDECLARED_MAJOR: &str = "Undeclared";

/// 학생 기록
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Student {
    student_id: u64,
    name: String,
    grade: String,
    major: String,
    added_date: NaiveDate,
}

impl Student {
    pub fn builder() -> StudentBuilder {
        StudentBuilder::new()
    }

    pub fn student_id(&self) -> u64 {
        self.student_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn added_date(&self) -> NaiveDate {
        self.added_date
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Name: {:20} | Grade: {:2} | Major: {:15} | Added: {}",
            self.student_id,
            self.name,
            self.grade,
            self.major,
            self.added_date.format("%Y-%m-%d")
        )
    }
}

/// Student 빌더
///
/// 빌더로 들어온 값은 모두 정규화 된다. 이름과 전공은 Title Case, 성적은 대문자로 변환된다.
#[derive(Debug, Clone, Default)]
pub struct StudentBuilder {
    student_id: Option<u64>,
    name: Option<String>,
    grade: Option<String>,
    major: Option<String>,
    added_date: Option<NaiveDate>,
}

impl StudentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn student_id(mut self, student_id: u64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn grade(mut self, grade: &str) -> Self {
        self.grade = Some(grade.to_owned());
        self
    }

    pub fn major(mut self, major: &str) -> Self {
        self.major = Some(major.to_owned());
        self
    }

    pub fn added_date(mut self, added_date: NaiveDate) -> Self {
        self.added_date = Some(added_date);
        self
    }

    pub fn build(self) -> Result<Student, ItemError> {
        let student_id = self.student_id
            .ok_or(ItemError::RequireArgumentMissing("student_id".to_owned()))?;
        let name = non_blank(self.name.as_deref())
            .map(title_case)
            .ok_or(ItemError::RequireArgumentMissing("name".to_owned()))?;
        let added_date = self.added_date
            .ok_or(ItemError::RequireArgumentMissing("added_date".to_owned()))?;

        let grade = self.grade
            .map(|g| g.trim().to_uppercase())
            .unwrap_or_default();
        let major = non_blank(self.major.as_deref())
            .map(title_case)
            .unwrap_or_else(|| UNDECLARED_MAJOR.to_owned());

        Ok(Student {
            student_id,
            name,
            grade,
            major,
            added_date,
        })
    }
}

/// 학생 등록 입력값
#[derive(Debug, Clone, Default)]
pub struct StudentDraft {
    pub student_id: String,
    pub name: String,
    pub grade: String,
    pub major: String,
}

/// 학생 수정 입력값으로 비어있는 항목은 기존 값을 유지한다.
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

/// 학번 문자열을 검증하고 숫자로 변환한다.
pub fn parse_student_id(raw: &str) -> Result<u64, ItemError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ItemError::RequireArgumentMissing("student_id".to_owned()));
    }
    if !STUDENT_ID.is_match(raw) {
        return Err(ItemError::InvalidArgument(format!("ID must be a number: {}", raw)));
    }

    raw.parse::<u64>()
        .map_err(|e| ItemError::InvalidArgument(format!("ID out of range: {} ({})", raw, e)))
}

impl Record for Student {
    type Key = u64;
    type Scheme = ();
    type Draft = StudentDraft;
    type Patch = StudentPatch;

    fn create(draft: StudentDraft, _: (), today: NaiveDate) -> Result<Self, ItemError> {
        Student::builder()
            .student_id(parse_student_id(&draft.student_id)?)
            .name(&draft.name)
            .grade(&draft.grade)
            .major(&draft.major)
            .added_date(today)
            .build()
    }

    fn parse_key(raw: &str, _: ()) -> Result<u64, ItemError> {
        parse_student_id(raw)
    }

    fn key(&self, _: ()) -> u64 {
        self.student_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, patch: StudentPatch) {
        if let Some(name) = non_blank(patch.name.as_deref()) {
            self.name = title_case(name);
        }
        if let Some(grade) = non_blank(patch.grade.as_deref()) {
            self.grade = grade.to_uppercase();
        }
        if let Some(major) = non_blank(patch.major.as_deref()) {
            self.major = title_case(major);
        }
    }
}
