use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ArchiveService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;

#[utoipa::path(
    get,
    path = "/log",
    tag = "log",
    responses(
        (status = 200, description = "归档文件名列表", body = [String]),
        (status = 404, description = "归档目录不存在")
    )
)]
pub async fn list_logs(service: web::Data<ArchiveService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(names) => Ok(HttpResponse::Ok().json(ApiResponse::success(names))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/log/{filename}",
    tag = "log",
    params(
        ("filename" = String, Path, description = "归档文件名 (*.json)")
    ),
    responses(
        (status = 200, description = "归档内容"),
        (status = 400, description = "文件名非法"),
        (status = 404, description = "归档不存在")
    )
)]
pub async fn get_log(
    service: web::Data<ArchiveService>,
    filename: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get(&filename).await {
        Ok(records) => Ok(HttpResponse::Ok().json(ApiResponse::success(records))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/save-to-log",
    tag = "log",
    request_body = SaveToLogRequest,
    responses(
        (status = 200, description = "历史已归档, 返回文件名"),
        (status = 400, description = "文件名非法")
    )
)]
/// 把当前开奖历史保存到 `log/` 目录
///
/// 请求体可以为空 (使用默认文件名), 但不能是无法解析的 JSON。
pub async fn save_to_log(
    service: web::Data<ArchiveService>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let req = match parse_save_request(&body) {
        Ok(req) => req,
        Err(e) => return Ok(e.error_response()),
    };
    match service.save_snapshot(req.filename.as_deref(), Utc::now()).await {
        Ok(name) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            name,
            "History saved to log",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

fn parse_save_request(body: &[u8]) -> AppResult<SaveToLogRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SaveToLogRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::ValidationError(format!("Invalid request body: {e}")))
}

pub fn log_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/log", web::get().to(list_logs))
        .route("/log/{filename}", web::get().to(get_log))
        .route("/save-to-log", web::post().to(save_to_log));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_request() {
        assert!(parse_save_request(b"").unwrap().filename.is_none());
        assert!(parse_save_request(b" \n").unwrap().filename.is_none());
        assert_eq!(
            parse_save_request(br#"{"filename":"jan"}"#).unwrap().filename.as_deref(),
            Some("jan")
        );
        assert!(parse_save_request(br#"{"filename": "../x""#).is_err());
    }
}
