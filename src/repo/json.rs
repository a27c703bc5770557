use crate::repo::{PersistenceError, SnapshotStore};
use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON 파일 하나에 스냅샷을 저장하는 저장소
///
/// 저장은 같은 디렉토리의 임시 파일에 먼저 쓴 뒤 원래 파일로 이름을 바꾸기 때문에
/// 저장 도중 실패하더라도 이전 스냅샷은 그대로 남는다.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut path: OsString = self.path.as_os_str().to_os_string();
        path.push(".tmp");
        PathBuf::from(path)
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load_snapshot(&self) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("스냅샷 파일이 없습니다. => {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save_snapshot(&mut self, contents: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path).map_err(|e| self.io_error(e))?;
            file.write_all(contents.as_bytes()).map_err(|e| self.io_error(e))?;
            file.write_all(b"\n").map_err(|e| self.io_error(e))?;
            file.sync_all().map_err(|e| self.io_error(e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            self.io_error(e)
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
