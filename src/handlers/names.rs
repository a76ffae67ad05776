use crate::models::*;
use crate::services::ReservationService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/names",
    tag = "names",
    responses(
        (status = 200, description = "当前预约列表", body = [Reservation])
    )
)]
pub async fn get_names(service: web::Data<ReservationService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/reserve",
    tag = "names",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "预约或释放成功"),
        (status = 400, description = "号码缺失或超出范围")
    )
)]
/// 预约号码; 昵称为空时释放该号码
pub async fn reserve(
    service: web::Data<ReservationService>,
    req: web::Json<ReserveRequest>,
) -> Result<HttpResponse> {
    match service.reserve(req.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/clear-names",
    tag = "names",
    responses(
        (status = 200, description = "已清空全部预约")
    )
)]
pub async fn clear_names(service: web::Data<ReservationService>) -> Result<HttpResponse> {
    match service.clear().await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message("Reservations cleared"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn names_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/names", web::get().to(get_names))
        .route("/reserve", web::post().to(reserve))
        .route("/clear-names", web::post().to(clear_names));
}
