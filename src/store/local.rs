use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{CollectionKey, Snapshot, Store, Version, parse_records};
use crate::error::{AppError, AppResult};

/// 本地文件存储, 版本号为文件内容的 MD5
pub struct LocalStore {
    root: PathBuf,
    // 版本检查与写入必须是原子的
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn file_path(&self, key: &CollectionKey) -> PathBuf {
        self.root.join(key.path())
    }

    fn version_of(bytes: &[u8]) -> Version {
        Version::new(format!("{:x}", md5::compute(bytes)))
    }

    async fn current_version(&self, path: &Path) -> AppResult<Version> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Self::version_of(&bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Version::absent()),
            Err(e) => Err(io_error(path, e)),
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::StoreUnavailable(format!("{}: {e}", path.display()))
}

#[async_trait]
impl Store for LocalStore {
    async fn read(&self, key: &CollectionKey) -> AppResult<Snapshot> {
        let path = self.file_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("{key} not found")));
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        Ok(Snapshot {
            records: parse_records(key, &bytes)?,
            version: Self::version_of(&bytes),
        })
    }

    async fn write(
        &self,
        key: &CollectionKey,
        records: &[Value],
        expected: &Version,
    ) -> AppResult<Version> {
        let path = self.file_path(key);
        let _guard = self.write_lock.lock().await;

        let current = self.current_version(&path).await?;
        if &current != expected {
            return Err(AppError::Conflict(format!("{key} was modified concurrently")));
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        // 先写临时文件再重命名, 避免读到半截内容
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        Ok(Self::version_of(&bytes))
    }

    async fn list(&self, dir: &str) -> AppResult<Vec<String>> {
        let path = self.root.join(dir);
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(format!("directory {dir} not found")));
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&path, e))? {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file && let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
