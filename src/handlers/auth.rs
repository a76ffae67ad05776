use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/auth",
    tag = "auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "口令正确"),
        (status = 401, description = "口令错误")
    )
)]
/// 校验管理口令
pub async fn auth(
    service: web::Data<AuthService>,
    req: web::Json<AuthRequest>,
) -> Result<HttpResponse> {
    match service.verify(&req.password) {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth", web::post().to(auth));
}
