pub mod sort;

use crate::item::{ItemError, Record, SortKey};
use crate::repo::PersistenceError;
use std::collections::HashMap;

/// 카탈로그와 레저에서 발생하는 에러
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("record already exists: {0}")]
    DuplicateKey(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record is not checked out: {0}")]
    NotCheckedOut(String),

    #[error(transparent)]
    Validation(#[from] ItemError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// 유일한 키를 가진 레코드들의 순서 있는 모음
///
/// 레코드는 `records`에 카탈로그 순서대로 저장되고, `index`는 키로 위치를 찾는 보조 색인이다.
/// 두 구조는 항상 같은 레코드 집합을 가리켜야 하며 순서가 바뀌는 연산 뒤에는 색인을 다시 만든다.
#[derive(Debug, Clone)]
pub struct Catalog<R: Record> {
    scheme: R::Scheme,
    records: Vec<R>,
    index: HashMap<R::Key, usize>,
}

impl<R: Record> Catalog<R> {
    pub fn new(scheme: R::Scheme) -> Self {
        Self {
            scheme,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// 저장소에서 읽은 레코드들로 카탈로그를 만든다. 순서는 그대로 유지된다.
    pub fn from_records(scheme: R::Scheme, records: Vec<R>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(scheme);
        for record in records {
            record.check(scheme)?;
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    pub fn scheme(&self) -> R::Scheme {
        self.scheme
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 카탈로그 순서대로 모든 레코드를 순회한다.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.index.contains_key(key)
    }

    pub fn insert(&mut self, record: R) -> Result<(), CatalogError> {
        let key = record.key(self.scheme);
        if self.index.contains_key(&key) {
            return Err(CatalogError::DuplicateKey(key.to_string()));
        }

        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn find(&self, key: &R::Key) -> Option<&R> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn find_mut(&mut self, key: &R::Key) -> Option<&mut R> {
        self.index.get(key).map(|&i| &mut self.records[i])
    }

    /// 키 또는 이름에 검색어가 대소문자 구분 없이 포함된 레코드를 카탈로그 순서대로 돌려준다.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a R> + use<'a, R> {
        let term = term.trim().to_lowercase();
        let scheme = self.scheme;

        self.records.iter().filter(move |record| {
            record.key(scheme).to_string().to_lowercase().contains(&term)
                || record.name().to_lowercase().contains(&term)
        })
    }

    /// 레코드를 수정한다. 수정으로 키가 바뀌면서 다른 레코드와 겹치면 아무것도 바꾸지 않는다.
    pub fn update(&mut self, key: &R::Key, patch: R::Patch) -> Result<&R, CatalogError> {
        let position = *self.index.get(key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;

        let mut updated = self.records[position].clone();
        updated.apply(patch);

        let new_key = updated.key(self.scheme);
        if &new_key != key {
            if self.index.contains_key(&new_key) {
                return Err(CatalogError::DuplicateKey(new_key.to_string()));
            }
            self.index.remove(key);
            self.index.insert(new_key, position);
        }

        self.records[position] = updated;
        Ok(&self.records[position])
    }

    pub fn delete(&mut self, key: &R::Key) -> Result<R, CatalogError> {
        let position = self.index.remove(key)
            .ok_or_else(|| CatalogError::NotFound(key.to_string()))?;

        let removed = self.records.remove(position);
        for i in self.index.values_mut() {
            if *i > position {
                *i -= 1;
            }
        }
        Ok(removed)
    }

    /// 카탈로그 자체의 순서를 바꾼다. 두 기준 모두 안정 정렬이다.
    pub fn sort(&mut self, criterion: SortKey) {
        let scheme = self.scheme;
        match criterion {
            SortKey::Id => sort::insertion_sort_by(&mut self.records, |a, b| a.key(scheme).cmp(&b.key(scheme))),
            SortKey::Name => sort::bubble_sort_by(&mut self.records, |a, b| a.name().cmp(b.name())),
        }
        self.reindex();
    }

    pub fn sorted_view(&mut self, criterion: SortKey) -> impl Iterator<Item = &R> {
        self.sort(criterion);
        self.records.iter()
    }

    fn reindex(&mut self) {
        self.index = self.records.iter()
            .enumerate()
            .map(|(i, record)| (record.key(self.scheme), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::book::{Book, BookDraft, BookPatch, KeyScheme, TextKey};
    use crate::item::student::{Student, StudentDraft, StudentPatch};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn student(id: &str, name: &str) -> Student {
        let draft = StudentDraft {
            student_id: id.to_owned(),
            name: name.to_owned(),
            grade: "a".to_owned(),
            major: "cs".to_owned(),
        };
        Student::create(draft, (), today()).unwrap()
    }

    fn book(isbn: &str, title: &str) -> Book {
        let draft = BookDraft {
            isbn: isbn.to_owned(),
            title: title.to_owned(),
            author: "someone".to_owned(),
        };
        Book::create(draft, KeyScheme::Title, today()).unwrap()
    }

    fn ids(catalog: &Catalog<Student>) -> Vec<u64> {
        catalog.records().map(|s| s.student_id()).collect()
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut catalog = Catalog::new(());
        catalog.insert(student("1", "bob")).unwrap();
        catalog.insert(student("2", "ann")).unwrap();

        let result = catalog.insert(student("1", "carl"));

        assert!(matches!(result, Err(CatalogError::DuplicateKey(key)) if key == "1"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find(&1).unwrap().name(), "Bob");
    }

    #[test]
    fn find_by_text_key_ignores_case() {
        let mut catalog = Catalog::new(KeyScheme::Title);
        catalog.insert(book("1", "dune")).unwrap();

        assert!(catalog.find(&TextKey::new("DUNE")).is_some());
        assert!(catalog.find(&TextKey::new("dune messiah")).is_none());
    }

    #[test]
    fn search_matches_key_or_name_in_catalog_order() {
        let mut catalog = Catalog::new(());
        catalog.insert(student("31", "zed")).unwrap();
        catalog.insert(student("12", "ann lee")).unwrap();
        catalog.insert(student("40", "LEE parks")).unwrap();

        let by_name: Vec<u64> = catalog.search("lee").map(|s| s.student_id()).collect();
        assert_eq!(by_name, vec![12, 40]);

        let by_id: Vec<u64> = catalog.search("1").map(|s| s.student_id()).collect();
        assert_eq!(by_id, vec![31, 12]);

        assert_eq!(catalog.search("").count(), 3);
        assert_eq!(catalog.search("nobody").count(), 0);
        // 같은 검색을 다시 시작할 수 있다.
        assert_eq!(catalog.search("lee").count(), 2);
    }

    #[test]
    fn update_merges_blank_fields() {
        let mut catalog = Catalog::new(());
        catalog.insert(student("1", "bob smith")).unwrap();

        let patch = StudentPatch {
            name: Some("  ".to_owned()),
            grade: Some("c".to_owned()),
            major: Some("electrical engineering".to_owned()),
        };
        let updated = catalog.update(&1, patch).unwrap();

        assert_eq!(updated.name(), "Bob Smith");
        assert_eq!(updated.grade(), "C");
        assert_eq!(updated.major(), "Electrical Engineering");
    }

    #[test]
    fn update_unknown_key_fails() {
        let mut catalog: Catalog<Student> = Catalog::new(());
        let result = catalog.update(&9, StudentPatch::default());
        assert!(matches!(result, Err(CatalogError::NotFound(key)) if key == "9"));
    }

    #[test]
    fn update_that_changes_key_is_reindexed() {
        let mut catalog = Catalog::new(KeyScheme::Title);
        catalog.insert(book("1", "dune")).unwrap();
        catalog.insert(book("2", "emma")).unwrap();

        let patch = BookPatch { title: Some("dune messiah".to_owned()), author: None };
        catalog.update(&TextKey::new("dune"), patch).unwrap();

        assert!(catalog.find(&TextKey::new("dune")).is_none());
        assert_eq!(catalog.find(&TextKey::new("dune messiah")).unwrap().isbn(), Some("1"));
    }

    #[test]
    fn update_that_collides_leaves_catalog_intact() {
        let mut catalog = Catalog::new(KeyScheme::Title);
        catalog.insert(book("1", "dune")).unwrap();
        catalog.insert(book("2", "emma")).unwrap();

        let patch = BookPatch { title: Some("EMMA".to_owned()), author: Some("x".to_owned()) };
        let result = catalog.update(&TextKey::new("dune"), patch);

        assert!(matches!(result, Err(CatalogError::DuplicateKey(_))));
        let dune = catalog.find(&TextKey::new("dune")).unwrap();
        assert_eq!(dune.title(), "Dune");
        assert_eq!(dune.author(), "Someone");
    }

    #[test]
    fn delete_removes_and_keeps_order() {
        let mut catalog = Catalog::new(());
        for (id, name) in [("3", "c"), ("1", "a"), ("2", "b")] {
            catalog.insert(student(id, name)).unwrap();
        }

        let removed = catalog.delete(&1).unwrap();

        assert_eq!(removed.student_id(), 1);
        assert_eq!(ids(&catalog), vec![3, 2]);
        assert_eq!(catalog.find(&2).unwrap().name(), "B");
        assert!(matches!(catalog.delete(&1), Err(CatalogError::NotFound(_))));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn sorted_views_by_id_and_name() {
        let mut catalog = Catalog::new(());
        catalog.insert(student("1", "bob smith")).unwrap();
        catalog.insert(student("2", "ann lee")).unwrap();

        let names: Vec<String> = catalog.sorted_view(SortKey::Name).map(|s| s.name().to_owned()).collect();
        assert_eq!(names, vec!["Ann Lee", "Bob Smith"]);

        let ids: Vec<u64> = catalog.sorted_view(SortKey::Id).map(|s| s.student_id()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let mut catalog = Catalog::new(());
        for (id, name) in [("5", "kim"), ("3", "lee"), ("9", "kim"), ("1", "lee"), ("4", "ahn")] {
            catalog.insert(student(id, name)).unwrap();
        }

        catalog.sort(SortKey::Name);
        assert_eq!(ids(&catalog), vec![4, 5, 9, 3, 1]);

        catalog.sort(SortKey::Id);
        let once = ids(&catalog);
        catalog.sort(SortKey::Id);
        assert_eq!(ids(&catalog), once);
        assert_eq!(once, vec![1, 3, 4, 5, 9]);

        // 정렬 뒤에도 색인이 올바르다.
        assert_eq!(catalog.find(&9).unwrap().name(), "Kim");
        catalog.delete(&3).unwrap();
        assert_eq!(catalog.find(&4).unwrap().name(), "Ahn");
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let result = Catalog::from_records((), vec![student("1", "a"), student("1", "b")]);
        assert!(matches!(result, Err(CatalogError::DuplicateKey(_))));
    }

    #[test]
    fn from_records_checks_scheme() {
        let untitled = book("", "dune");
        let result = Catalog::from_records(KeyScheme::Isbn, vec![untitled]);
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }
}
