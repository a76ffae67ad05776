//! 持久化适配层
//!
//! 所有集合都是 JSON 数组, 以版本号做乐观并发控制: 每次写入都必须携带
//! 上一次读取得到的版本号, 版本过期时返回 `AppError::Conflict`。
//! 本地文件与 GitHub 内容 API 两种实现通过配置选择。

pub mod local;
pub mod repository;

pub use local::LocalStore;
pub use repository::Repository;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, AppResult};
use crate::external::GithubContentStore;

/// 集合键, 对应存储中的一个 JSON 文件
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    History,
    Names,
    Prizes,
    /// `log/` 目录下的历史归档, 名称需先经过 `validate_archive_name`
    Log(String),
}

impl CollectionKey {
    pub const LOG_DIR: &'static str = "log";

    pub fn path(&self) -> String {
        match self {
            CollectionKey::History => "history.json".to_string(),
            CollectionKey::Names => "names.json".to_string(),
            CollectionKey::Prizes => "prizes.json".to_string(),
            CollectionKey::Log(name) => format!("{}/{}", Self::LOG_DIR, name),
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// 集合版本号; `None` 表示集合尚不存在
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Version(Option<String>);

impl Version {
    pub fn absent() -> Self {
        Version(None)
    }

    pub fn new(token: impl Into<String>) -> Self {
        Version(Some(token.into()))
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

/// 一次读取的结果: 记录 + 版本号
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<Value>,
    pub version: Version,
}

/// 解析集合文件内容; 空文件 (或只有空白) 视为空集合
pub(crate) fn parse_records(key: &CollectionKey, bytes: &[u8]) -> AppResult<Vec<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::StoreUnavailable(format!("{key} is not a JSON array: {e}")))
}

#[async_trait]
pub trait Store: Send + Sync {
    /// 读取集合; 不存在时返回 `NotFound`, 传输或鉴权失败返回 `StoreUnavailable`
    async fn read(&self, key: &CollectionKey) -> AppResult<Snapshot>;

    /// 条件写入; `expected` 过期时返回 `Conflict`, 成功返回新版本号
    async fn write(
        &self,
        key: &CollectionKey,
        records: &[Value],
        expected: &Version,
    ) -> AppResult<Version>;

    /// 列出目录下的文件名 (按名称排序); 目录不存在时返回 `NotFound`
    async fn list(&self, dir: &str) -> AppResult<Vec<String>>;
}

/// 按配置创建存储实现
pub fn build_store(config: &StoreConfig) -> AppResult<Arc<dyn Store>> {
    match config.backend {
        StoreBackend::Local => {
            log::info!("Using local store at {}", config.data_dir);
            Ok(Arc::new(LocalStore::new(&config.data_dir)))
        }
        StoreBackend::Github => {
            let github = &config.github;
            if !github.has_credentials() {
                log::error!(
                    "GitHub store credentials are missing, storage endpoints will be unavailable"
                );
            } else {
                log::info!(
                    "Using GitHub store {}/{}@{}",
                    github.owner,
                    github.repo,
                    github.branch
                );
            }
            let store =
                GithubContentStore::new(github.clone(), Duration::from_secs(config.timeout_secs))?;
            Ok(Arc::new(store))
        }
    }
}
