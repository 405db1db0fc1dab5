use crate::{
    api::{attendance, events, export, scanner, student},
    auth::{
        handlers,
        middleware::{auth_middleware, page_auth_middleware},
    },
    config::Config,
    pages,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // only fails for a zero period or burst, both clamped above
        .expect("valid rate limit");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));

    // Browser login
    cfg.service(
        web::resource("/login")
            .wrap(login_limiter.clone())
            .route(web::get().to(handlers::login_page))
            .route(web::post().to(handlers::login_form)),
    )
    .service(web::resource("/logout").route(web::get().to(handlers::logout)))
    .service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Desk page
    cfg.service(
        web::resource("/")
            .wrap(from_fn(page_auth_middleware))
            .route(web::get().to(pages::index)),
    )
    .service(web::resource("/static/dashboard.js").route(web::get().to(pages::dashboard_js)))
    .service(web::resource("/export/excel").route(web::get().to(export::export_excel)))
    .service(web::resource("/export/pdf").route(web::get().to(export::export_pdf)))
    .service(
        web::resource("/clear_data")
            .wrap(from_fn(auth_middleware))
            .route(web::post().to(attendance::clear_data)),
    );

    // API
    cfg.service(
        web::scope("/api")
            .service(web::resource("/attendance").route(web::get().to(attendance::get_attendance)))
            .service(
                web::resource("/attendance/rows")
                    .route(web::get().to(attendance::attendance_rows)),
            )
            .service(web::resource("/events").route(web::get().to(events::events)))
            .service(
                web::resource("/start_scanner").route(web::post().to(scanner::start_scanner)),
            )
            .service(web::resource("/test_scan").route(web::post().to(scanner::test_scan)))
            // /student/{roll_no}
            .service(
                web::resource("/student/{roll_no}")
                    .wrap(from_fn(auth_middleware))
                    .route(web::get().to(student::get_student)),
            ),
    );
}

// LOGIN (form or JSON)
//  └─ access_token, also set as the attendance_token cookie

// OPEN: /export/excel, /export/pdf, every /api route but the student lookup

// PROTECTED: /, /clear_data, /api/student/{roll_no}
//  └─ Authorization: Bearer access_token, or the cookie

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::push::EventHub;
    use crate::services::students::StudentDirectory;
    use actix_web::{App, http::StatusCode, http::header, test};

    #[actix_web::test]
    async fn dashboard_redirects_anonymous_visitors_to_login() {
        let config = Config::for_tests();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_pool().await))
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(EventHub::default()))
                .app_data(web::Data::new(StudentDirectory::default()))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/student/R1").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/attendance").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/export/excel").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn cookie_from_form_login_opens_the_dashboard() {
        let config = Config::for_tests();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_pool().await))
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(EventHub::default()))
                .app_data(web::Data::new(StudentDirectory::default()))
                .configure(|cfg| configure(cfg, &config)),
        )
        .await;

        let login = test::TestRequest::post()
            .uri("/login")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_form([("username", "admin"), ("password", "1234")])
            .to_request();
        let resp = test::call_service(&app, login).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == crate::auth::middleware::TOKEN_COOKIE)
            .unwrap()
            .into_owned();

        let page = test::TestRequest::get().uri("/").cookie(cookie).to_request();
        let resp = test::call_service(&app, page).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains(r#"id="scan-info""#));
    }
}
