use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::models::{AddHistoryRequest, DrawRecord};
use crate::store::{CollectionKey, Repository};
use crate::utils::parse_date_label;

/// 手动补录时缺省的中奖者名称
pub const UNKNOWN_WINNER: &str = "Unknown";

#[derive(Clone)]
pub struct HistoryService {
    repo: Repository,
}

impl HistoryService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AppResult<Vec<DrawRecord>> {
        let (records, _) = self.repo.load(&CollectionKey::History).await?;
        Ok(records)
    }

    /// 定时开奖写入: 只尝试一次, 冲突由下一次开奖兜底
    pub async fn append_once(&self, record: DrawRecord) -> AppResult<()> {
        self.repo
            .update_with_attempts(&CollectionKey::History, 1, move |items: &mut Vec<DrawRecord>| {
                items.push(record.clone());
                Ok(())
            })
            .await
    }

    pub async fn add(&self, req: AddHistoryRequest) -> AppResult<DrawRecord> {
        let date = require_date(req.date.as_deref())?;
        let number = require_number(req.number)?;

        let record = DrawRecord {
            date,
            number,
            name: req
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_WINNER.to_string()),
            prize: req.prize.unwrap_or_default(),
            chosen_number: req.chosen_number,
        };

        let stored = record.clone();
        self.repo
            .update(&CollectionKey::History, move |items: &mut Vec<DrawRecord>| {
                items.push(stored.clone());
                Ok(())
            })
            .await?;

        log::info!("History record added: {} #{}", record.date, record.number);
        Ok(record)
    }

    /// 整体替换历史
    pub async fn replace(&self, records: Vec<DrawRecord>) -> AppResult<usize> {
        for record in &records {
            require_number(Some(record.number))?;
        }
        let count = records.len();
        self.repo
            .update(&CollectionKey::History, move |items: &mut Vec<DrawRecord>| {
                *items = records.clone();
                Ok(())
            })
            .await?;
        log::info!("History replaced with {count} records");
        Ok(count)
    }

    /// 删除日期与号码都匹配的记录, 返回删除条数
    pub async fn delete(&self, date: Option<&str>, number: Option<u32>) -> AppResult<usize> {
        let date = require_text(date, "date")?;
        let number = number.ok_or_else(|| AppError::ValidationError("number is required".into()))?;

        let removed = self
            .repo
            .update(&CollectionKey::History, |items: &mut Vec<DrawRecord>| {
                let before = items.len();
                items.retain(|r| !r.matches(&date, number));
                match before - items.len() {
                    0 => Err(AppError::NotFound("Record not found".into())),
                    n => Ok(n),
                }
            })
            .await?;

        log::info!("Deleted {removed} history record(s) for {date} #{number}");
        Ok(removed)
    }

    pub async fn update_winner(
        &self,
        date: Option<&str>,
        number: Option<u32>,
        name: Option<String>,
    ) -> AppResult<()> {
        let date = require_text(date, "date")?;
        let number = number.ok_or_else(|| AppError::ValidationError("number is required".into()))?;
        let name = name.unwrap_or_default();

        self.repo
            .update(&CollectionKey::History, |items: &mut Vec<DrawRecord>| {
                let record = items
                    .iter_mut()
                    .find(|r| r.matches(&date, number))
                    .ok_or_else(|| AppError::NotFound("Record not found".into()))?;
                record.name = name.clone();
                Ok(())
            })
            .await
    }

    /// 按日期 + 中奖者定位记录并设置奖品, 返回更新后的完整历史
    pub async fn update_winner_prize(
        &self,
        date: Option<&str>,
        name: Option<&str>,
        prize: Option<String>,
    ) -> AppResult<Vec<DrawRecord>> {
        let date = require_text(date, "date")?;
        let name = require_text(name, "name")?;
        let prize = prize.unwrap_or_default();

        let history = self
            .repo
            .update(&CollectionKey::History, |items: &mut Vec<DrawRecord>| {
                let record = items
                    .iter_mut()
                    .find(|r| r.date == date && r.name == name)
                    .ok_or_else(|| AppError::NotFound("Winner not found".into()))?;
                record.prize = prize.clone();
                Ok(items.clone())
            })
            .await?;

        log::info!("Prize \"{prize}\" saved for {name} ({date})");
        Ok(history)
    }

    /// 历史中所有可解析的开奖日期 (忽略无法解析的日期)
    pub async fn recorded_dates(&self) -> AppResult<Vec<NaiveDate>> {
        let records = self.list().await?;
        Ok(records.iter().filter_map(|r| parse_date_label(&r.date)).collect())
    }
}

fn require_text(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::ValidationError(format!("{field} is required"))),
    }
}

fn require_date(value: Option<&str>) -> AppResult<String> {
    let date = require_text(value, "date")?;
    if parse_date_label(&date).is_none() {
        return Err(AppError::ValidationError(format!(
            "date must be in DD.MM.YYYY format: {date}"
        )));
    }
    Ok(date)
}

pub(crate) fn require_number(value: Option<u32>) -> AppResult<u32> {
    match value {
        Some(n) if (1..=100).contains(&n) => Ok(n),
        Some(n) => Err(AppError::ValidationError(format!(
            "number must be between 1 and 100: {n}"
        ))),
        None => Err(AppError::ValidationError("number is required".into())),
    }
}
