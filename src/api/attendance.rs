use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::dashboard::render::render_rows;
use crate::model::attendance::AttendanceList;
use crate::push::{EventHub, PushEvent};
use crate::services::ledger;
use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Attendance list
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Newest rows, oldest first", body = AttendanceList),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_attendance(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let attendance = ledger::list_recent(pool.get_ref(), config.attendance_limit)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceList { attendance }))
}

/// Table body markup for the desk page
#[utoipa::path(
    get,
    path = "/api/attendance/rows",
    responses(
        (status = 200, description = "Rendered <tr> rows", body = String, content_type = "text/html"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_rows(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let rows = ledger::list_recent(pool.get_ref(), config.attendance_limit)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let markup = render_rows(&rows).map_err(|e| {
        error!(error = %e, "Failed to render attendance rows");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup))
}

/// Delete every attendance row
#[utoipa::path(
    post,
    path = "/clear_data",
    responses(
        (status = 200, description = "Ledger cleared", body = Object, example = json!({
            "success": true,
            "deleted": 42
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clear_data(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    hub: web::Data<EventHub>,
) -> actix_web::Result<impl Responder> {
    let deleted = ledger::clear(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to clear attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(admin = %auth.username, deleted, "Attendance cleared");
    hub.publish(PushEvent::DataCleared);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "deleted": deleted
    })))
}
