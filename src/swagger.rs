use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::history::get_history,
        handlers::history::add_history,
        handlers::history::save_history,
        handlers::history::delete_history,
        handlers::history::delete_history_by_path,
        handlers::history::update_winner,
        handlers::history::update_winner_prize,
        handlers::names::get_names,
        handlers::names::reserve,
        handlers::names::clear_names,
        handlers::prizes::get_prizes,
        handlers::prizes::update_prize,
        handlers::auth::auth,
        handlers::archive::list_logs,
        handlers::archive::get_log,
        handlers::archive::save_to_log,
        handlers::schedule::next_draw,
    ),
    components(
        schemas(
            DrawRecord,
            AddHistoryRequest,
            DeleteHistoryRequest,
            UpdateWinnerRequest,
            UpdateWinnerPrizeRequest,
            HistoryResponse,
            NextDrawResponse,
            Reservation,
            ReserveRequest,
            PrizeCounter,
            UpdatePrizeRequest,
            AuthRequest,
            SaveToLogRequest,
            ApiError,
        )
    ),
    tags(
        (name = "history", description = "Draw history API"),
        (name = "names", description = "Number reservation API"),
        (name = "prizes", description = "Prize inventory API"),
        (name = "auth", description = "Shared password check"),
        (name = "log", description = "History archive API"),
        (name = "schedule", description = "Draw schedule API"),
    ),
    info(
        title = "Draw Backend API",
        version = "0.1.0",
        description = "Scheduled number draw backend REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
