use crate::models::*;
use crate::services::HistoryService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses(
        (status = 200, description = "开奖历史", body = [DrawRecord]),
        (status = 503, description = "存储不可用")
    )
)]
/// 获取全部开奖历史 (每次都从存储读取)
pub async fn get_history(service: web::Data<HistoryService>) -> Result<HttpResponse> {
    match service.list().await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/add-history",
    tag = "history",
    request_body = AddHistoryRequest,
    responses(
        (status = 200, description = "记录已添加", body = DrawRecord),
        (status = 400, description = "日期或号码缺失")
    )
)]
pub async fn add_history(
    service: web::Data<HistoryService>,
    req: web::Json<AddHistoryRequest>,
) -> Result<HttpResponse> {
    match service.add(req.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            record,
            "Record added",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/save-history",
    tag = "history",
    request_body = [DrawRecord],
    responses(
        (status = 200, description = "历史已整体替换"),
        (status = 400, description = "记录无效")
    )
)]
/// 用请求体整体替换开奖历史
pub async fn save_history(
    service: web::Data<HistoryService>,
    req: web::Json<Vec<DrawRecord>>,
) -> Result<HttpResponse> {
    match service.replace(req.into_inner()).await {
        Ok(count) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "count": count },
            "message": "History saved"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/delete-history",
    tag = "history",
    request_body = DeleteHistoryRequest,
    responses(
        (status = 200, description = "记录已删除"),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn delete_history(
    service: web::Data<HistoryService>,
    req: web::Json<DeleteHistoryRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    delete_response(service.delete(req.date.as_deref(), req.number).await)
}

#[utoipa::path(
    delete,
    path = "/history/{date}/{number}",
    tag = "history",
    params(
        ("date" = String, Path, description = "开奖日期 (DD.MM.YYYY)"),
        ("number" = u32, Path, description = "开奖号码")
    ),
    responses(
        (status = 200, description = "记录已删除"),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn delete_history_by_path(
    service: web::Data<HistoryService>,
    path: web::Path<(String, u32)>,
) -> Result<HttpResponse> {
    let (date, number) = path.into_inner();
    delete_response(service.delete(Some(&date), Some(number)).await)
}

fn delete_response(result: crate::error::AppResult<usize>) -> Result<HttpResponse> {
    match result {
        Ok(removed) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "removed": removed },
            "message": "Record deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/update-winner",
    tag = "history",
    request_body = UpdateWinnerRequest,
    responses(
        (status = 200, description = "中奖者已更新"),
        (status = 400, description = "参数错误"),
        (status = 404, description = "记录不存在")
    )
)]
pub async fn update_winner(
    service: web::Data<HistoryService>,
    req: web::Json<UpdateWinnerRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    match service
        .update_winner(req.date.as_deref(), req.number, req.name)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::ok())),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/update-winner-prize",
    tag = "history",
    request_body = UpdateWinnerPrizeRequest,
    responses(
        (status = 200, description = "奖品已保存, 返回最新历史", body = HistoryResponse),
        (status = 404, description = "中奖者不存在")
    )
)]
/// 为中奖者设置奖品 (允许空值清除)
pub async fn update_winner_prize(
    service: web::Data<HistoryService>,
    req: web::Json<UpdateWinnerPrizeRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    match service
        .update_winner_prize(req.date.as_deref(), req.name.as_deref(), req.prize)
        .await
    {
        Ok(history) => Ok(HttpResponse::Ok().json(HistoryResponse {
            success: true,
            history,
        })),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn history_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/history", web::get().to(get_history))
        .route("/history/{date}/{number}", web::delete().to(delete_history_by_path))
        .route("/add-history", web::post().to(add_history))
        .route("/save-history", web::post().to(save_history))
        .route("/delete-history", web::post().to(delete_history))
        .route("/update-winner", web::post().to(update_winner))
        .route("/update-winner-prize", web::post().to(update_winner_prize));
}
