pub mod auth;
pub mod history;
pub mod archive;
pub mod names;
pub mod prizes;
pub mod schedule;

pub use auth::auth_config;
pub use history::history_config;
pub use archive::log_config;
pub use names::names_config;
pub use prizes::prizes_config;
pub use schedule::schedule_config;

use crate::error::AppError;
use actix_web::web;

/// JSON 解析失败时返回统一的错误包装
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// 路径参数解析失败 (如 `/history/{date}/abc`) 同样返回统一的错误包装
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

/// 注册全部路由
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .configure(history_config)
        .configure(names_config)
        .configure(prizes_config)
        .configure(auth_config)
        .configure(log_config)
        .configure(schedule_config);
}
