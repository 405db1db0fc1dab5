use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::scanner::Scanner;
use crate::services::scan::ScanProcessor;

fn default_test_barcode() -> String {
    "TEST123".to_string()
}

#[derive(Deserialize, ToSchema)]
pub struct TestScanReq {
    #[schema(example = "23BCA041")]
    #[serde(default = "default_test_barcode")]
    pub barcode: String,
}

/// Start the background barcode listener
#[utoipa::path(
    post,
    path = "/api/start_scanner",
    responses(
        (status = 200, description = "Listener state", body = Object, example = json!({
            "success": true,
            "started": true,
            "running": true
        }))
    ),
    tag = "Scanner"
)]
pub async fn start_scanner(scanner: web::Data<Scanner>) -> impl Responder {
    let started = scanner.start();
    info!(started, "Scanner start requested");

    HttpResponse::Ok().json(json!({
        "success": true,
        "started": started,
        "running": scanner.is_running()
    }))
}

/// Simulate a barcode scan
#[utoipa::path(
    post,
    path = "/api/test_scan",
    request_body = TestScanReq,
    responses(
        (status = 200, description = "Scan processed", body = Object, example = json!({
            "success": true,
            "message": "Test barcode 'TEST123' sent"
        })),
        (status = 400, description = "Blank barcode"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Scanner"
)]
pub async fn test_scan(
    processor: web::Data<ScanProcessor>,
    payload: web::Json<TestScanReq>,
) -> actix_web::Result<impl Responder> {
    let event = processor.handle_barcode(&payload.barcode).await.map_err(|e| {
        error!(error = %e, "Test scan failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match event {
        Some(event) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": format!("Test barcode '{}' sent", event.barcode),
            "action": event.action_label()
        }))),
        None => Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Barcode must not be blank"
        }))),
    }
}
