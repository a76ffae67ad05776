//! HTTP 端到端测试 (本地文件存储)

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};
use std::sync::Arc;

use draw_backend::{
    config::Config,
    handlers,
    services::Services,
    store::{CollectionKey, LocalStore, Repository, Store, Version},
    utils::DrawSchedule,
};

fn services(dir: &tempfile::TempDir) -> (Services, Arc<LocalStore>) {
    let store = Arc::new(LocalStore::new(dir.path()));
    let config = Config::default();
    let schedule = DrawSchedule::from_config(&config.draw).unwrap();
    let repo = Repository::new(store.clone(), config.store.conflict_retries);
    (Services::new(repo, schedule, &config), store)
}

macro_rules! app {
    ($services:expr) => {{
        let services = $services.clone();
        test::init_service(
            App::new()
                .configure(move |cfg| services.register(cfg))
                .configure(handlers::routes),
        )
        .await
    }};
}

async fn seed_prizes(store: &LocalStore) {
    store
        .write(
            &CollectionKey::Prizes,
            &[json!({"prize": "T-Shirt", "count": 10}), json!({"prize": "Mug", "count": 2})],
            &Version::absent(),
        )
        .await
        .unwrap();
}

#[actix_web::test]
async fn test_reserve_then_release() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/reserve")
        .set_json(json!({"number": 42, "nickname": "Bob"}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["success"], json!(true));

    let req = test::TestRequest::get().uri("/names").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["data"]
        .as_array()
        .unwrap()
        .contains(&json!({"number": 42, "nickname": "Bob"})));

    let req = test::TestRequest::post()
        .uri("/reserve")
        .set_json(json!({"number": 42, "nickname": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/names").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert!(resp["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["number"] != json!(42)));
}

#[actix_web::test]
async fn test_reserve_without_number_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/reserve")
        .set_json(json!({"nickname": "Bob"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].is_string());
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/reserve")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[actix_web::test]
async fn test_update_prize() {
    let dir = tempfile::tempdir().unwrap();
    let (services, store) = services(&dir);
    seed_prizes(&store).await;
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/update-prize")
        .set_json(json!({"prize": "T-Shirt", "count": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/prizes").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"][0], json!({"prize": "T-Shirt", "count": 3}));

    let before = store.read(&CollectionKey::Prizes).await.unwrap().version;
    let req = test::TestRequest::post()
        .uri("/update-prize")
        .set_json(json!({"prize": "Hat", "count": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(store.read(&CollectionKey::Prizes).await.unwrap().version, before);

    let req = test::TestRequest::post()
        .uri("/update-prize")
        .set_json(json!({"prize": "Mug", "count": -1}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_prizes_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::get().uri("/prizes").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_history_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::get().uri("/history").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!([]));

    for (date, number) in [("02.01.2024", 5), ("06.01.2024", 9)] {
        let req = test::TestRequest::post()
            .uri("/add-history")
            .set_json(json!({"date": date, "number": number, "name": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::post()
        .uri("/update-winner")
        .set_json(json!({"date": "06.01.2024", "number": 9, "name": "Alice"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/update-winner-prize")
        .set_json(json!({"date": "06.01.2024", "name": "Alice", "prize": "Mug"}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["success"], json!(true));
    assert_eq!(resp["history"][1]["prize"], json!("Mug"));

    let req = test::TestRequest::delete()
        .uri("/history/02.01.2024/5")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/delete-history")
        .set_json(json!({"date": "02.01.2024", "number": 5}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/history").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"].as_array().unwrap().len(), 1);
    assert_eq!(resp["data"][0]["name"], json!("Alice"));
}

#[actix_web::test]
async fn test_bad_path_param_uses_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::delete()
        .uri("/history/02.01.2024/abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[actix_web::test]
async fn test_save_to_log_body_handling() {
    let dir = tempfile::tempdir().unwrap();
    let (services, store) = services(&dir);
    let app = app!(services);

    // 请求体损坏时不能落到默认文件名
    let req = test::TestRequest::post()
        .uri("/save-to-log")
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"filename": "../x""#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(store.list("log").await.is_err());

    // 空请求体使用当天日期作为文件名
    let req = test::TestRequest::post().uri("/save-to-log").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["success"], json!(true));
    assert!(resp["data"].as_str().unwrap().ends_with(".json"));
}

#[actix_web::test]
async fn test_save_history_and_archive() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::get().uri("/log").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/save-history")
        .set_json(json!([
            {"date": "02.01.2024", "number": 5, "name": "", "prize": ""},
            {"date": "06.01.2024", "number": 9, "name": "Bob", "prize": "", "chosenNumber": "9"}
        ]))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/save-to-log")
        .set_json(json!({"filename": "january"}))
        .to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!("january.json"));

    let req = test::TestRequest::get().uri("/log").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!(["january.json"]));

    let req = test::TestRequest::get().uri("/log/january.json").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"][1]["chosenNumber"], json!("9"));

    let req = test::TestRequest::get().uri("/log/missing.json").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_auth_and_clear_names() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(json!({"password": "1001"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth")
        .set_json(json!({"password": "nope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/reserve")
        .set_json(json!({"number": 3, "nickname": "Eve"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/clear-names").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/names").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["data"], json!([]));
}

#[actix_web::test]
async fn test_next_draw() {
    let dir = tempfile::tempdir().unwrap();
    let (services, _) = services(&dir);
    let app = app!(services);

    let req = test::TestRequest::get().uri("/next-draw").to_request();
    let resp: Value = test::call_and_read_body_json(&app, req).await;
    let local = resp["data"]["next_draw_local"].as_str().unwrap();
    assert!(local.ends_with("T00:01:00+03:00"), "{local}");
}

#[actix_web::test]
async fn test_unconfigured_remote_store_degrades() {
    let mut config = Config::default();
    config.store.backend = draw_backend::config::StoreBackend::Github;
    let store = draw_backend::store::build_store(&config.store).unwrap();
    let schedule = DrawSchedule::from_config(&config.draw).unwrap();
    let services = Services::new(Repository::new(store, 0), schedule, &config);
    let app = app!(services);

    let req = test::TestRequest::get().uri("/history").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
