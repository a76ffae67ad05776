use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

use crate::models::DrawRecord;
use crate::services::HistoryService;
use crate::utils::DrawSchedule;

/// 一次开奖的结果
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub record: DrawRecord,
    /// 是否成功写入历史
    pub persisted: bool,
    /// 下一次开奖时刻
    pub next_draw: DateTime<Utc>,
}

#[derive(Clone)]
pub struct DrawService {
    history: HistoryService,
    schedule: DrawSchedule,
    persist_timeout: Duration,
}

impl DrawService {
    pub fn new(history: HistoryService, schedule: DrawSchedule, persist_timeout: Duration) -> Self {
        Self {
            history,
            schedule,
            persist_timeout,
        }
    }

    pub fn schedule(&self) -> &DrawSchedule {
        &self.schedule
    }

    /// 生成一条开奖记录 (1-100 均匀随机), 日期取参考时区
    pub fn roll(&self, now: DateTime<Utc>) -> DrawRecord {
        let number = rand::thread_rng().gen_range(1..=100);
        DrawRecord::new(self.schedule.date_label(now), number)
    }

    /// 开奖并写入历史, 然后计算下一次开奖时刻
    ///
    /// 写入失败 (存储错误/冲突/超时) 只记录日志, 不重试, 也不影响下一次排期。
    pub async fn draw(&self, now: DateTime<Utc>) -> DrawOutcome {
        let record = self.roll(now);

        let persisted = match tokio::time::timeout(
            self.persist_timeout,
            self.history.append_once(record.clone()),
        )
        .await
        {
            Ok(Ok(())) => {
                log::info!("Draw generated: {} #{}", record.date, record.number);
                true
            }
            Ok(Err(e)) => {
                log::error!(
                    "Failed to persist draw {} #{}: {e}",
                    record.date,
                    record.number
                );
                false
            }
            Err(_) => {
                log::error!(
                    "Persisting draw {} #{} timed out after {:?}",
                    record.date,
                    record.number,
                    self.persist_timeout
                );
                false
            }
        };

        DrawOutcome {
            record,
            persisted,
            next_draw: self.schedule.next_after(now),
        }
    }

    /// 不晚于 `now` 的最近一次已记录开奖时刻, 用作启动检查的锚点
    ///
    /// 晚于 `now` 的记录 (通常是手工录入的错误日期) 会被忽略并告警。
    pub async fn last_recorded_slot(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let dates = match self.history.recorded_dates().await {
            Ok(dates) => dates,
            Err(e) => {
                log::error!("Failed to read history for startup check: {e}");
                return None;
            }
        };

        let (past, future): (Vec<_>, Vec<_>) = dates
            .into_iter()
            .map(|d| self.schedule.slot_on(d))
            .partition(|slot| *slot <= now);
        if let Some(latest) = future.iter().max() {
            log::warn!(
                "Ignoring {} history record(s) dated after now (latest {latest})",
                future.len()
            );
        }
        past.into_iter().max()
    }
}
