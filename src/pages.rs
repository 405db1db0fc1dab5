use actix_web::{HttpResponse, Responder, web};
use askama::Template;
use sqlx::SqlitePool;
use tracing::error;

use crate::config::Config;
use crate::dashboard::render::{RowView, row_views};
use crate::services::ledger;

const DASHBOARD_JS: &str = include_str!("../static/dashboard.js");

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub rows: Vec<RowView<'a>>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    pub error: Option<&'a str>,
}

/// Renders a page, or a bare 500 if the template fails.
pub fn html<T: Template>(page: &T) -> HttpResponse {
    match page.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Desk dashboard, with the current rows already in the table.
pub async fn index(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let rows = ledger::list_recent(pool.get_ref(), config.attendance_limit)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list attendance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(html(&DashboardPage {
        rows: row_views(&rows),
    }))
}

pub async fn dashboard_js() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(DASHBOARD_JS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceRecord;

    #[test]
    fn dashboard_page_has_the_elements_the_script_expects() {
        let records = [AttendanceRecord {
            roll: "R1".into(),
            status: "In Library".into(),
            ..Default::default()
        }];
        let page = DashboardPage {
            rows: row_views(&records),
        }
        .render()
        .unwrap();

        for id in [r#"id="tbody""#, r#"id="scan-info""#, r#"id="refresh""#] {
            assert!(page.contains(id), "missing {id}");
        }
        assert!(page.contains(">R1</td>"));
        assert!(page.contains(r#"href="/export/excel""#));
    }

    #[test]
    fn login_error_is_escaped() {
        let page = LoginPage {
            error: Some("<bad>"),
        }
        .render()
        .unwrap();
        assert!(page.contains("&lt;bad&gt;"));

        let page = LoginPage { error: None }.render().unwrap();
        assert!(!page.contains("text-red-600"));
    }
}
