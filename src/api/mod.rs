pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::context::AppContext;
use handlers::ApiDoc;

pub fn router(ctx: AppContext) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/dashboard/refresh", post(handlers::refresh_dashboard))
        .route(
            "/dashboard/auto-refresh/toggle",
            post(handlers::toggle_auto_refresh),
        )
        .route("/dashboard/filter/{category}", post(handlers::select_filter))
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms/{id}", get(handlers::get_room))
        .route("/rooms/{id}/history", get(handlers::get_room_history))
        .route(
            "/preferences",
            get(handlers::get_preferences).put(handlers::put_preferences),
        )
        .route(
            "/session",
            get(handlers::get_session)
                .post(handlers::login)
                .delete(handlers::logout),
        )
        .route("/notifications", get(handlers::list_notifications))
        .route(
            "/notifications/read-all",
            post(handlers::mark_all_notifications_read),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::mark_notification_read),
        )
        .route("/notifications/{id}", delete(handlers::delete_notification))
        .route("/devices", get(handlers::list_devices))
        .route("/devices/scan", post(handlers::scan_devices))
        .with_state(ctx)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
