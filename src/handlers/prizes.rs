use crate::models::*;
use crate::services::PrizeService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/prizes",
    tag = "prizes",
    responses(
        (status = 200, description = "奖品库存列表", body = [PrizeCounter]),
        (status = 404, description = "奖品文件不存在")
    )
)]
pub async fn get_prizes(service: web::Data<PrizeService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/update-prize",
    tag = "prizes",
    request_body = UpdatePrizeRequest,
    responses(
        (status = 200, description = "库存已更新"),
        (status = 400, description = "参数错误"),
        (status = 404, description = "奖品不存在")
    )
)]
/// 更新已有奖品的库存数量
pub async fn update_prize(
    service: web::Data<PrizeService>,
    req: web::Json<UpdatePrizeRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    match service.update_count(req.prize.as_deref(), req.count).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn prizes_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/prizes", web::get().to(get_prizes))
        .route("/update-prize", web::post().to(update_prize));
}
