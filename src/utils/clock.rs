use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 定时开奖使用的时钟抽象, 测试中可替换为手动推进的时钟
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 挂起直到 `deadline` (可能提前醒来, 调用方需再次检查 `now`)
    async fn sleep_until(&self, deadline: DateTime<Utc>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep_until(&self, deadline: DateTime<Utc>) {
        let delay = (deadline - Utc::now()).to_std().unwrap_or_default();
        tokio::time::sleep(delay).await;
    }
}
