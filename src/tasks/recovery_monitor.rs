use chrono::{DateTime, Utc};

use crate::services::{DrawOutcome, DrawService};
use crate::utils::Clock;

/// 监视器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// 启动后尚未确认 `next` 是否已经错过
    Checking(DateTime<Utc>),
    /// 已排期, 等待 `next` 到来
    Armed(DateTime<Utc>),
}

impl MonitorState {
    pub fn next_draw(&self) -> DateTime<Utc> {
        match *self {
            MonitorState::Checking(next) | MonitorState::Armed(next) => next,
        }
    }
}

/// 定时开奖与漏开补偿
///
/// 启动时以最近一次已记录开奖为锚点计算应开奖时刻, 若已经过去则立即补开一次
/// (不论错过多少期都只补一次), 否则进入排期。之后每次定时触发都开奖并重新排期,
/// 写入失败也照常排期。
pub struct RecoveryMonitor<C: Clock> {
    draws: DrawService,
    clock: C,
    state: MonitorState,
}

impl<C: Clock> RecoveryMonitor<C> {
    pub async fn start(draws: DrawService, clock: C) -> Self {
        let now = clock.now();
        let anchor = draws.last_recorded_slot(now).await.unwrap_or(now);
        let next = draws.schedule().next_after(anchor);
        log::info!("Draw monitor started, expected draw at {next}");

        Self {
            draws,
            clock,
            state: MonitorState::Checking(next),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// 启动检查: 错过的开奖立即补开; 已排期时不做任何事
    pub async fn check(&mut self) -> Option<DrawOutcome> {
        let MonitorState::Checking(next) = self.state else {
            return None;
        };

        let now = self.clock.now();
        if now >= next {
            log::warn!("Missed draw scheduled at {next}, drawing now");
            Some(self.fire(now).await)
        } else {
            self.arm(next);
            None
        }
    }

    /// 等待下一次开奖并执行; 提前醒来时保持排期并返回 `None`
    pub async fn tick(&mut self) -> Option<DrawOutcome> {
        let next = match self.state {
            MonitorState::Checking(_) => return self.check().await,
            MonitorState::Armed(next) => next,
        };

        self.clock.sleep_until(next).await;
        let now = self.clock.now();
        if now < next {
            return None;
        }
        Some(self.fire(now).await)
    }

    pub async fn run(mut self) {
        self.check().await;
        loop {
            self.tick().await;
        }
    }

    async fn fire(&mut self, now: DateTime<Utc>) -> DrawOutcome {
        let outcome = self.draws.draw(now).await;
        self.arm(outcome.next_draw);
        outcome
    }

    fn arm(&mut self, next: DateTime<Utc>) {
        let delay = next - self.clock.now();
        log::info!(
            "Next draw armed for {next} (in {}h {}m)",
            delay.num_hours(),
            delay.num_minutes() % 60
        );
        self.state = MonitorState::Armed(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrawConfig;
    use crate::error::{AppError, AppResult};
    use crate::models::DrawRecord;
    use crate::services::HistoryService;
    use crate::store::{CollectionKey, LocalStore, Repository, Snapshot, Store, Version};
    use crate::utils::DrawSchedule;
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    /// 手动时钟: sleep_until 直接把时间推进到截止时刻
    #[derive(Clone)]
    struct ManualClock {
        now: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }

        async fn sleep_until(&self, deadline: DateTime<Utc>) {
            let mut now = self.now.lock().unwrap();
            if *now < deadline {
                *now = deadline;
            }
        }
    }

    /// 读正常、写总是失败的存储
    struct ReadOnlyStore;

    #[async_trait]
    impl Store for ReadOnlyStore {
        async fn read(&self, key: &CollectionKey) -> AppResult<Snapshot> {
            Err(AppError::NotFound(format!("{key} not found")))
        }

        async fn write(&self, _: &CollectionKey, _: &[Value], _: &Version) -> AppResult<Version> {
            Err(AppError::StoreUnavailable("disk on fire".into()))
        }

        async fn list(&self, _: &str) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    /// 读正常、写永远挂起的存储
    struct StalledWriteStore;

    #[async_trait]
    impl Store for StalledWriteStore {
        async fn read(&self, key: &CollectionKey) -> AppResult<Snapshot> {
            Err(AppError::NotFound(format!("{key} not found")))
        }

        async fn write(&self, _: &CollectionKey, _: &[Value], _: &Version) -> AppResult<Version> {
            std::future::pending().await
        }

        async fn list(&self, _: &str) -> AppResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn msk(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn draw_service(store: Arc<dyn Store>) -> (DrawService, HistoryService) {
        let history = HistoryService::new(Repository::new(store, 3));
        let schedule = DrawSchedule::from_config(&DrawConfig::default()).unwrap();
        (
            DrawService::new(history.clone(), schedule, std::time::Duration::from_secs(5)),
            history,
        )
    }

    #[tokio::test]
    async fn test_first_boot_arms_without_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        // 周三
        let clock = ManualClock::at(msk(2024, 1, 3, 10, 0));

        let mut monitor = RecoveryMonitor::start(draws, clock).await;
        assert_eq!(monitor.state(), MonitorState::Checking(msk(2024, 1, 6, 0, 1)));
        assert!(monitor.check().await.is_none());
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 6, 0, 1)));
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missed_draw_is_recovered_once() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        history.append_once(DrawRecord::new("02.01.2024", 5)).await.unwrap();

        // 进程在周六的开奖时刻停机, 周日才启动
        let clock = ManualClock::at(msk(2024, 1, 7, 9, 30));
        let mut monitor = RecoveryMonitor::start(draws.clone(), clock.clone()).await;
        assert_eq!(monitor.state(), MonitorState::Checking(msk(2024, 1, 6, 0, 1)));

        let outcome = monitor.check().await.unwrap();
        assert!(outcome.persisted);
        assert_eq!(outcome.record.date, "07.01.2024");
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 9, 0, 1)));

        // 紧接着再次检查不会重复开奖
        assert!(monitor.check().await.is_none());

        // 同一时刻重启的新监视器也不会再补开
        let mut restarted = RecoveryMonitor::start(draws, clock).await;
        assert!(restarted.check().await.is_none());
        assert_eq!(history.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_long_outage_recovers_single_draw() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        history.append_once(DrawRecord::new("02.01.2024", 5)).await.unwrap();

        let clock = ManualClock::at(msk(2024, 2, 1, 12, 0));
        let mut monitor = RecoveryMonitor::start(draws, clock).await;
        assert!(monitor.check().await.is_some());
        assert!(monitor.check().await.is_none());
        assert_eq!(history.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_future_dated_record_does_not_block_recovery() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        history.append_once(DrawRecord::new("02.01.2024", 5)).await.unwrap();
        history.append_once(DrawRecord::new("02.01.2042", 7)).await.unwrap();

        let clock = ManualClock::at(msk(2024, 1, 7, 9, 30));
        let mut monitor = RecoveryMonitor::start(draws, clock).await;
        assert_eq!(monitor.state(), MonitorState::Checking(msk(2024, 1, 6, 0, 1)));
        assert!(monitor.check().await.is_some());
        assert_eq!(history.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ticks_follow_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        let clock = ManualClock::at(msk(2024, 1, 1, 12, 0));

        let mut monitor = RecoveryMonitor::start(draws, clock.clone()).await;
        assert!(monitor.check().await.is_none());

        let first = monitor.tick().await.unwrap();
        assert_eq!(clock.now(), msk(2024, 1, 2, 0, 1));
        assert_eq!(first.record.date, "02.01.2024");
        assert_eq!(first.next_draw, msk(2024, 1, 6, 0, 1));

        let second = monitor.tick().await.unwrap();
        assert_eq!(second.record.date, "06.01.2024");
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 9, 0, 1)));

        let dates: Vec<String> = history.list().await.unwrap().into_iter().map(|r| r.date).collect();
        assert_eq!(dates, vec!["02.01.2024", "06.01.2024"]);
    }

    #[tokio::test]
    async fn test_persist_failure_keeps_monitor_armed() {
        let (draws, _) = draw_service(Arc::new(ReadOnlyStore));
        let clock = ManualClock::at(msk(2024, 1, 1, 12, 0));

        let mut monitor = RecoveryMonitor::start(draws, clock.clone()).await;
        monitor.check().await;

        let outcome = monitor.tick().await.unwrap();
        assert!(!outcome.persisted);
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 6, 0, 1)));

        let outcome = monitor.tick().await.unwrap();
        assert!(!outcome.persisted);
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 9, 0, 1)));
    }

    #[tokio::test]
    async fn test_stalled_write_times_out_and_rearms() {
        let history = HistoryService::new(Repository::new(Arc::new(StalledWriteStore), 3));
        let schedule = DrawSchedule::from_config(&DrawConfig::default()).unwrap();
        let draws = DrawService::new(history, schedule, std::time::Duration::from_millis(100));
        let clock = ManualClock::at(msk(2024, 1, 1, 12, 0));

        let mut monitor = RecoveryMonitor::start(draws, clock).await;
        monitor.check().await;

        let outcome = monitor.tick().await.unwrap();
        assert!(!outcome.persisted);
        assert_eq!(outcome.next_draw, msk(2024, 1, 6, 0, 1));
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 6, 0, 1)));
    }

    /// sleep_until 立即返回但不推进时间, 模拟提前唤醒
    struct StuckClock(DateTime<Utc>);

    #[async_trait]
    impl Clock for StuckClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }

        async fn sleep_until(&self, _deadline: DateTime<Utc>) {}
    }

    #[tokio::test]
    async fn test_early_wakeup_stays_armed() {
        let dir = tempfile::tempdir().unwrap();
        let (draws, history) = draw_service(Arc::new(LocalStore::new(dir.path())));
        let mut monitor = RecoveryMonitor::start(draws, StuckClock(msk(2024, 1, 1, 12, 0))).await;
        monitor.check().await;

        assert!(monitor.tick().await.is_none());
        assert_eq!(monitor.state(), MonitorState::Armed(msk(2024, 1, 2, 0, 1)));
        assert!(history.list().await.unwrap().is_empty());
    }
}
