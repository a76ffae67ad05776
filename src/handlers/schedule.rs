use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpResponse, Result, web};
use chrono::{SecondsFormat, Utc};

#[utoipa::path(
    get,
    path = "/next-draw",
    tag = "schedule",
    responses(
        (status = 200, description = "下一次开奖时间", body = NextDrawResponse)
    )
)]
pub async fn next_draw(service: web::Data<DrawService>) -> Result<HttpResponse> {
    let schedule = service.schedule();
    let next = schedule.next_after(Utc::now());
    Ok(HttpResponse::Ok().json(ApiResponse::success(NextDrawResponse {
        next_draw: next.to_rfc3339_opts(SecondsFormat::Secs, true),
        next_draw_local: schedule
            .to_reference(next)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        date: schedule.date_label(next),
    })))
}

pub fn schedule_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/next-draw", web::get().to(next_draw));
}
