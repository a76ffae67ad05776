use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use draw_backend::{
    config::Config,
    handlers,
    middlewares::create_cors,
    services::Services,
    store::{Repository, build_store},
    swagger::swagger_config,
    tasks,
    utils::DrawSchedule,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration");

    // 开奖规则
    let schedule = DrawSchedule::from_config(&config.draw).expect("Invalid draw schedule");

    // 存储: 凭据缺失不会退出, 相关接口返回 StoreUnavailable
    let store = build_store(&config.store).expect("Failed to create store");
    let repo = Repository::new(store, config.store.conflict_retries);

    let services = Services::new(repo, schedule, &config);

    // 定时开奖与漏开补偿
    tasks::spawn_all(services.draws.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .configure(move |cfg| services.register(cfg))
            .configure(swagger_config)
            .configure(handlers::routes)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
