use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use utoipa::OpenApi;
use uuid::Uuid;

use super::{
    dto::{
        AutoRefreshDto, DashboardDto, DeviceDto, DeviceParams, DevicesDto, FilterDto, HistoryDto,
        HistoryParams, HistoryPointDto, LoginRequest, NotificationsDto, PreferencesForm,
        RefreshDto, RoomDto, SessionDto,
    },
    errors::AppError,
};
use crate::{
    comfort::{Comfort, ComfortCounts},
    context::AppContext,
    devices::{
        models::parse_status_filter, BatteryLevel, DeviceCounts, DeviceStatus, ScanReport,
        SensorKind,
    },
    notifications::{Notification, NotificationKind, Severity},
    pipeline::{AutoRefresh, Filter},
    preferences::{Preferences, Theme},
    readings::history::{self, TimeRange},
    session::{Role, User},
    units::TemperatureUnit,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Current dashboard: filtered rooms, per-band counts over all rooms, and
/// refresh state.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = DashboardDto),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(ctx): State<AppContext>) -> Json<DashboardDto> {
    let view = ctx.pipeline.view().await;
    Json(DashboardDto::new(view, &ctx.preferences.current()))
}

/// Regenerate readings now, regardless of auto-refresh.
#[utoipa::path(
    post,
    path = "/dashboard/refresh",
    responses(
        (status = 200, description = "New snapshot generation", body = RefreshDto),
    ),
    tag = "dashboard"
)]
pub async fn refresh_dashboard(State(ctx): State<AppContext>) -> Json<RefreshDto> {
    let generation = ctx.pipeline.refresh_now().await;
    Json(RefreshDto { generation })
}

/// Pause a running auto-refresh, or resume a paused one.
#[utoipa::path(
    post,
    path = "/dashboard/auto-refresh/toggle",
    responses(
        (status = 200, description = "Resulting auto-refresh state", body = AutoRefreshDto),
    ),
    tag = "dashboard"
)]
pub async fn toggle_auto_refresh(State(ctx): State<AppContext>) -> Json<AutoRefreshDto> {
    let auto_refresh = ctx.pipeline.toggle_auto_refresh().await;
    Json(AutoRefreshDto { auto_refresh })
}

/// Select a comfort category. Selecting the active one clears the filter.
#[utoipa::path(
    post,
    path = "/dashboard/filter/{category}",
    params(
        ("category" = Filter, Path, description = "all, comfortable, warm or hot"),
    ),
    responses(
        (status = 200, description = "Resulting filter", body = FilterDto),
        (status = 400, description = "Unknown category"),
    ),
    tag = "dashboard"
)]
pub async fn select_filter(
    State(ctx): State<AppContext>,
    Path(category): Path<String>,
) -> Result<Json<FilterDto>, AppError> {
    let selected: Filter = category
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
    let filter = ctx.pipeline.select_filter(selected).await;
    Ok(Json(FilterDto { filter }))
}

// ---------------------------------------------------------------------------
// Rooms
// ---------------------------------------------------------------------------

/// Every room in the current snapshot, ignoring the dashboard filter.
#[utoipa::path(
    get,
    path = "/rooms",
    responses(
        (status = 200, description = "All rooms", body = Vec<RoomDto>),
    ),
    tag = "rooms"
)]
pub async fn list_rooms(State(ctx): State<AppContext>) -> Json<Vec<RoomDto>> {
    let unit = ctx.preferences.current().temperature_unit;
    let rooms = ctx.pipeline.rooms().await;
    Json(rooms.into_iter().map(|r| RoomDto::new(r, unit)).collect())
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    params(
        ("id" = u32, Path, description = "Room id"),
    ),
    responses(
        (status = 200, description = "Room reading", body = RoomDto),
        (status = 404, description = "Unknown room"),
    ),
    tag = "rooms"
)]
pub async fn get_room(
    State(ctx): State<AppContext>,
    Path(id): Path<u32>,
) -> Result<Json<RoomDto>, AppError> {
    let room = ctx
        .pipeline
        .room(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("room {id} not found")))?;
    Ok(Json(RoomDto::new(room, ctx.preferences.current().temperature_unit)))
}

/// Hourly history around the room's current reading. Synthesized per request.
#[utoipa::path(
    get,
    path = "/rooms/{id}/history",
    params(
        ("id" = u32, Path, description = "Room id"),
        ("range" = Option<String>, Query, description = "6h, 12h or 24h (default)"),
    ),
    responses(
        (status = 200, description = "Hourly points, oldest first", body = HistoryDto),
        (status = 400, description = "Unknown range"),
        (status = 404, description = "Unknown room"),
    ),
    tag = "rooms"
)]
pub async fn get_room_history(
    State(ctx): State<AppContext>,
    Path(id): Path<u32>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryDto>, AppError> {
    let range = match params.range.as_deref() {
        Some(raw) => raw
            .parse::<TimeRange>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => TimeRange::default(),
    };
    let room = ctx
        .pipeline
        .room(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("room {id} not found")))?;

    let unit = ctx.preferences.current().temperature_unit;
    let points = history::synthesize(&room, range, Utc::now(), &mut rand::rng());

    Ok(Json(HistoryDto {
        room_id: id,
        range,
        points: points
            .into_iter()
            .map(|p| HistoryPointDto::new(p, unit))
            .collect(),
    }))
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/preferences",
    responses(
        (status = 200, description = "Current preferences", body = Preferences),
    ),
    tag = "preferences"
)]
pub async fn get_preferences(State(ctx): State<AppContext>) -> Json<Preferences> {
    Json(ctx.preferences.current())
}

/// Replace all preferences. A new refresh interval applies to a running
/// auto-refresh immediately.
#[utoipa::path(
    put,
    path = "/preferences",
    request_body = PreferencesForm,
    responses(
        (status = 200, description = "Saved preferences", body = Preferences),
        (status = 400, description = "Invalid field value"),
    ),
    tag = "preferences"
)]
pub async fn put_preferences(
    State(ctx): State<AppContext>,
    Json(form): Json<PreferencesForm>,
) -> Result<Json<Preferences>, AppError> {
    let prefs = Preferences::try_from(form)?;
    let saved = ctx.preferences.save(prefs).await?;
    Ok(Json(saved))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Signed-in user, or null", body = SessionDto),
    ),
    tag = "session"
)]
pub async fn get_session(State(ctx): State<AppContext>) -> Json<SessionDto> {
    Json(SessionDto {
        user: ctx.session.current_user().await,
    })
}

#[utoipa::path(
    post,
    path = "/session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionDto),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "session"
)]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionDto>, AppError> {
    let user = ctx.session.login(&req.email, &req.password).await?;
    Ok(Json(SessionDto { user: Some(user) }))
}

#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 200, description = "Signed out", body = SessionDto),
    ),
    tag = "session"
)]
pub async fn logout(State(ctx): State<AppContext>) -> Result<Json<SessionDto>, AppError> {
    ctx.session.logout().await?;
    Ok(Json(SessionDto { user: None }))
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = NotificationsDto),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(State(ctx): State<AppContext>) -> Json<NotificationsDto> {
    Json(NotificationsDto {
        unread_count: ctx.notifications.unread_count().await,
        notifications: ctx.notifications.list().await,
    })
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    responses(
        (status = 200, description = "All notifications read", body = NotificationsDto),
    ),
    tag = "notifications"
)]
pub async fn mark_all_notifications_read(State(ctx): State<AppContext>) -> Json<NotificationsDto> {
    ctx.notifications.mark_all_read().await;
    list_notifications(State(ctx)).await
}

#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification id"),
    ),
    responses(
        (status = 200, description = "Notification read", body = NotificationsDto),
        (status = 404, description = "Unknown notification"),
    ),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationsDto>, AppError> {
    if !ctx.notifications.mark_read(id).await {
        return Err(AppError::NotFound(format!("notification {id} not found")));
    }
    Ok(list_notifications(State(ctx)).await)
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(
        ("id" = Uuid, Path, description = "Notification id"),
    ),
    responses(
        (status = 200, description = "Notification removed", body = NotificationsDto),
        (status = 404, description = "Unknown notification"),
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationsDto>, AppError> {
    if !ctx.notifications.remove(id).await {
        return Err(AppError::NotFound(format!("notification {id} not found")));
    }
    Ok(list_notifications(State(ctx)).await)
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// Sensor inventory with per-status counts.
#[utoipa::path(
    get,
    path = "/devices",
    params(
        ("status" = Option<String>, Query, description = "all (default), online, offline or warning"),
    ),
    responses(
        (status = 200, description = "Devices matching the filter", body = DevicesDto),
        (status = 400, description = "Unknown status"),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(ctx): State<AppContext>,
    Query(params): Query<DeviceParams>,
) -> Result<Json<DevicesDto>, AppError> {
    let filter = parse_status_filter(params.status.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let devices = ctx.devices.list(filter).await;

    Ok(Json(DevicesDto {
        devices: devices.into_iter().map(DeviceDto::from).collect(),
        counts: ctx.devices.counts().await,
        filter,
        last_scan: ctx.devices.last_scan().await,
        scanning: ctx.devices.is_scanning(),
    }))
}

/// Scan the network for new sensors. Responds once the scan completes.
#[utoipa::path(
    post,
    path = "/devices/scan",
    responses(
        (status = 200, description = "Scan result", body = ScanReport),
        (status = 409, description = "A scan is already running"),
    ),
    tag = "devices"
)]
pub async fn scan_devices(State(ctx): State<AppContext>) -> Result<Json<ScanReport>, AppError> {
    let report = ctx.devices.scan(&ctx.notifications).await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        get_dashboard,
        refresh_dashboard,
        toggle_auto_refresh,
        select_filter,
        list_rooms,
        get_room,
        get_room_history,
        get_preferences,
        put_preferences,
        get_session,
        login,
        logout,
        list_notifications,
        mark_all_notifications_read,
        mark_notification_read,
        delete_notification,
        list_devices,
        scan_devices,
        health,
    ),
    components(schemas(
        DashboardDto, RoomDto, RefreshDto, AutoRefreshDto, FilterDto, HistoryDto,
        HistoryPointDto, PreferencesForm, LoginRequest, SessionDto, NotificationsDto,
        Comfort, ComfortCounts, Filter, AutoRefresh, TimeRange, Preferences, Theme,
        TemperatureUnit, User, Role, Notification, NotificationKind, Severity, DevicesDto,
        DeviceDto, DeviceCounts, DeviceStatus, SensorKind, BatteryLevel, ScanReport,
    )),
    tags(
        (name = "dashboard",     description = "Live comfort overview"),
        (name = "rooms",         description = "Per-room readings and history"),
        (name = "preferences",   description = "Display and refresh settings"),
        (name = "session",       description = "Demo sign-in"),
        (name = "notifications", description = "Comfort alerts"),
        (name = "devices",       description = "Sensor health and discovery"),
        (name = "system",        description = "System endpoints"),
    ),
    info(
        title = "ComfortCheck API",
        version = "0.1.0",
        description = "Simulated classroom comfort dashboard"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
