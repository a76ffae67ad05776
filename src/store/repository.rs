use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::{CollectionKey, Store, Version};
use crate::error::{AppError, AppResult};

/// 带类型的集合访问, 在 `Store` 之上完成 JSON 转换与读-改-写
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn Store>,
    conflict_retries: u32,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>, conflict_retries: u32) -> Self {
        Self {
            store,
            conflict_retries,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// 读取集合, 不存在时视为空
    pub async fn load<T: DeserializeOwned>(&self, key: &CollectionKey) -> AppResult<(Vec<T>, Version)> {
        match self.load_existing(key).await {
            Ok(loaded) => Ok(loaded),
            Err(e) if e.is_not_found() => Ok((Vec::new(), Version::absent())),
            Err(e) => Err(e),
        }
    }

    /// 读取集合, 不存在时返回 `NotFound`
    pub async fn load_existing<T: DeserializeOwned>(
        &self,
        key: &CollectionKey,
    ) -> AppResult<(Vec<T>, Version)> {
        let snapshot = self.store.read(key).await?;
        let records = snapshot
            .records
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| AppError::InternalError(format!("{key} contains invalid records: {e}")))?;
        Ok((records, snapshot.version))
    }

    pub async fn save<T: Serialize>(
        &self,
        key: &CollectionKey,
        records: &[T],
        expected: &Version,
    ) -> AppResult<Version> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        self.store.write(key, &values, expected).await
    }

    /// 读-改-写, 版本冲突时重新读取并重放 `apply`, 最多额外重试 `conflict_retries` 次
    pub async fn update<T, R, F>(&self, key: &CollectionKey, apply: F) -> AppResult<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnMut(&mut Vec<T>) -> AppResult<R>,
    {
        self.update_with_attempts(key, self.conflict_retries + 1, apply)
            .await
    }

    /// `apply` 返回错误时不会写入
    pub async fn update_with_attempts<T, R, F>(
        &self,
        key: &CollectionKey,
        attempts: u32,
        mut apply: F,
    ) -> AppResult<R>
    where
        T: DeserializeOwned + Serialize,
        F: FnMut(&mut Vec<T>) -> AppResult<R>,
    {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            let (mut records, version) = self.load::<T>(key).await?;
            let result = apply(&mut records)?;

            match self.save(key, &records, &version).await {
                Ok(_) => return Ok(result),
                Err(e) if e.is_conflict() && attempt < attempts => {
                    log::warn!("Write conflict on {key}, retrying ({attempt}/{attempts})");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
