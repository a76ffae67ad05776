use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppResult;
use crate::store::{CollectionKey, Repository};
use crate::utils::{DrawSchedule, normalize_archive_name, validate_archive_name};

/// `log/` 目录下的历史归档
#[derive(Clone)]
pub struct ArchiveService {
    repo: Repository,
    schedule: DrawSchedule,
}

impl ArchiveService {
    pub fn new(repo: Repository, schedule: DrawSchedule) -> Self {
        Self { repo, schedule }
    }

    /// 归档文件名列表; 目录不存在时返回 `NotFound`
    pub async fn list(&self) -> AppResult<Vec<String>> {
        let names = self.repo.store().list(CollectionKey::LOG_DIR).await?;
        Ok(names.into_iter().filter(|n| n.ends_with(".json")).collect())
    }

    pub async fn get(&self, filename: &str) -> AppResult<Vec<Value>> {
        validate_archive_name(filename)?;
        let (records, _) = self
            .repo
            .load_existing(&CollectionKey::Log(filename.to_string()))
            .await?;
        Ok(records)
    }

    /// 把当前历史保存为归档, 同名归档会被覆盖; 返回最终文件名
    pub async fn save_snapshot(
        &self,
        filename: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let name = match filename.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => normalize_archive_name(name)?,
            None => normalize_archive_name(&self.schedule.date_label(now))?,
        };

        let (history, _) = self.repo.load::<Value>(&CollectionKey::History).await?;
        let count = history.len();
        self.repo
            .update(&CollectionKey::Log(name.clone()), move |items: &mut Vec<Value>| {
                *items = history.clone();
                Ok(())
            })
            .await?;

        log::info!("Saved {count} history records to log/{name}");
        Ok(name)
    }
}
