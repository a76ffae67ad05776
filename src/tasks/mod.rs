//! 后台定时任务
//!
//! 目前只有定时开奖监视器, 启动时调用一次 `spawn_all`。

pub mod recovery_monitor;

pub use recovery_monitor::{MonitorState, RecoveryMonitor};

use crate::services::DrawService;
use crate::utils::SystemClock;

/// 启动所有后台任务 (通过 `tokio::spawn` 分离, 不阻塞)
pub fn spawn_all(draw_service: DrawService) {
    tokio::spawn(async move {
        let monitor = RecoveryMonitor::start(draw_service, SystemClock).await;
        monitor.run().await;
    });
}
