use crate::repo::{PersistenceError, SnapshotStore};
use std::io;

/// 메모리에만 스냅샷을 보관하는 저장소
///
/// 테스트나 저장이 필요 없는 실행에 사용한다. `fail_writes`를 켜면 저장 시 항상 실패한다.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<String>,
    saves: usize,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_owned()),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// 성공한 저장 횟수
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn set_fail_writes(&mut self, fail_writes: bool) {
        self.fail_writes = fail_writes;
    }
}

impl SnapshotStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.contents.clone())
    }

    fn save_snapshot(&mut self, contents: &str) -> Result<(), PersistenceError> {
        if self.fail_writes {
            return Err(PersistenceError::Io {
                path: self.location(),
                source: io::Error::other("writes disabled"),
            });
        }

        self.contents = Some(contents.to_owned());
        self.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_owned()
    }
}
