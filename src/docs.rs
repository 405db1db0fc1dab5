use crate::api::scanner::TestScanReq;
use crate::model::attendance::{AttendanceList, AttendanceRecord};
use crate::model::scan::{ScanEvent, ScanRecord};
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Attendance API",
        version = "1.0.0",
        description = r#"
## Library Attendance Desk

Barcode-driven entry/exit ledger for a library desk.

### 🔹 Key Features
- **Attendance**
  - Every scan toggles a student between *In Library* (walk-in) and *Completed* (walk-out)
  - List the ledger as JSON or as ready-to-insert table rows
- **Push channel**
  - `GET /api/events` streams `connect`, `barcode_scanned` and `data_cleared` server-sent events
- **Scanner**
  - Start the background listener or simulate a scan
- **Export**
  - Download the whole ledger as Excel or PDF

### 🔐 Security
Clearing data and student lookups require the desk admin's **JWT Bearer** token
(or the dashboard cookie set by `/login`).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::get_attendance,
        crate::api::attendance::attendance_rows,
        crate::api::attendance::clear_data,

        crate::api::events::events,

        crate::api::scanner::start_scanner,
        crate::api::scanner::test_scan,

        crate::api::student::get_student,

        crate::api::export::export_excel,
        crate::api::export::export_pdf,

        crate::auth::handlers::login
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceList,
            ScanEvent,
            ScanRecord,
            TestScanReq,
            LoginReqDto,
            LoginResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Push", description = "Real-time scan notifications"),
        (name = "Scanner", description = "Barcode listener control"),
        (name = "Students", description = "Student directory"),
        (name = "Export", description = "Excel and PDF downloads"),
        (name = "Auth", description = "Desk admin login"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_desk_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/attendance",
            "/api/events",
            "/api/test_scan",
            "/clear_data",
            "/auth/login",
            "/export/pdf",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = &doc.components.as_ref().unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
