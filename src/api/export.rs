use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::Local;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::model::attendance::AttendanceRecord;
use crate::services::{export, ledger};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

async fn all_rows(pool: &SqlitePool) -> actix_web::Result<Vec<AttendanceRecord>> {
    ledger::list_all(pool).await.map_err(|e| {
        error!(error = %e, "Failed to list attendance for export");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(bytes)
}

/// Whole ledger as an Excel workbook
#[utoipa::path(
    get,
    path = "/export/excel",
    responses(
        (status = 200, description = "attendance.xlsx, oldest row first", body = String,
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Export"
)]
pub async fn export_excel(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let rows = all_rows(pool.get_ref()).await?;
    let bytes = export::to_xlsx(&rows).map_err(|e| {
        error!(error = %e, "Excel export failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(rows = rows.len(), "Excel export");
    Ok(attachment(XLSX_CONTENT_TYPE, "attendance.xlsx", bytes))
}

/// Whole ledger as a PDF table
#[utoipa::path(
    get,
    path = "/export/pdf",
    responses(
        (status = 200, description = "A4 landscape table, oldest row first", body = String,
            content_type = "application/pdf"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Export"
)]
pub async fn export_pdf(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let rows = all_rows(pool.get_ref()).await?;
    let bytes = export::to_pdf(&rows).map_err(|e| {
        error!(error = %e, "PDF export failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(rows = rows.len(), "PDF export");
    let filename = format!(
        "attendance_export_{}.pdf",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    Ok(attachment("application/pdf", &filename, bytes))
}
