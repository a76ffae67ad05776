pub mod archive_service;
pub mod auth_service;
pub mod draw_service;
pub mod history_service;
pub mod prize_service;
pub mod reservation_service;

pub use archive_service::*;
pub use auth_service::*;
pub use draw_service::*;
pub use history_service::*;
pub use prize_service::*;
pub use reservation_service::*;

use actix_web::web;
use std::time::Duration;

use crate::config::Config;
use crate::store::Repository;
use crate::utils::DrawSchedule;

/// 所有服务的集合, 在 HTTP 层与后台任务之间共享
#[derive(Clone)]
pub struct Services {
    pub history: HistoryService,
    pub reservations: ReservationService,
    pub prizes: PrizeService,
    pub archive: ArchiveService,
    pub auth: AuthService,
    pub draws: DrawService,
}

impl Services {
    pub fn new(repo: Repository, schedule: DrawSchedule, config: &Config) -> Self {
        let history = HistoryService::new(repo.clone());
        let draws = DrawService::new(
            history.clone(),
            schedule.clone(),
            Duration::from_secs(config.draw.persist_timeout_secs),
        );

        Self {
            reservations: ReservationService::new(repo.clone()),
            prizes: PrizeService::new(repo.clone()),
            archive: ArchiveService::new(repo, schedule),
            auth: AuthService::new(config.auth.password.clone()),
            history,
            draws,
        }
    }

    /// 注册为 actix 的 app_data
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.history.clone()))
            .app_data(web::Data::new(self.reservations.clone()))
            .app_data(web::Data::new(self.prizes.clone()))
            .app_data(web::Data::new(self.archive.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.draws.clone()));
    }
}
