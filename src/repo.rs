pub mod json;
pub mod memory;
pub mod snapshot;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::SnapshotRecord;

/// 스냅샷 저장소에서 발생하는 에러
///
/// 파일이 없는 경우는 에러가 아니며 [`SnapshotStore::load_snapshot`]이 `Ok(None)`을 반환한다.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to access snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 읽을 수는 있었지만 내용을 해석할 수 없는 스냅샷
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// 카탈로그 전체 상태를 보관하는 저장소
///
/// 프로그램 시작 시 한 번 읽고, 변경이 있을 때마다 전체를 덮어쓴다. 부분 쓰기는 지원하지 않는다.
pub trait SnapshotStore {

    /// 저장된 스냅샷을 읽는다. 저장된 적이 없다면 [`None`]을 반환한다.
    fn load_snapshot(&self) -> Result<Option<String>, PersistenceError>;

    /// 이전 스냅샷을 전달 받은 내용으로 완전히 교체한다.
    fn save_snapshot(&mut self, contents: &str) -> Result<(), PersistenceError>;

    /// 로그와 메시지에 표시할 저장소 위치
    fn location(&self) -> String;
}
