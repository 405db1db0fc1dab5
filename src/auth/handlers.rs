use crate::{
    auth::{jwt::generate_access_token, middleware::TOKEN_COOKIE, password::verify_password},
    config::Config,
    models::{LoginReqDto, LoginResponse},
    pages::{self, LoginPage},
};
use actix_web::{
    HttpResponse, Responder,
    cookie::{Cookie, SameSite},
    http::{StatusCode, header},
    web,
};
use derive_more::Display;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Display, PartialEq)]
enum LoginError {
    #[display(fmt = "Username or password required")]
    MissingFields,
    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,
    #[display(fmt = "Internal Server Error")]
    Internal,
}

/// Checks the desk admin credentials and issues an access token.
fn issue_token(user: &LoginReqDto, config: &Config) -> Result<String, LoginError> {
    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(LoginError::MissingFields);
    }

    if user.username.trim() != config.admin_username {
        info!("Invalid credentials: unknown user");
        return Err(LoginError::InvalidCredentials);
    }

    debug!("Verifying password");
    if let Err(e) = verify_password(&user.password, &config.admin_password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(LoginError::InvalidCredentials);
    }

    generate_access_token(
        config.admin_username.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        LoginError::Internal
    })
}

fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish()
}

/// Admin login (JSON)
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Username or password required"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(config, user),
    fields(username = %user.username)
)]
pub async fn login(user: web::Json<LoginReqDto>, config: web::Data<Config>) -> impl Responder {
    info!("Login request received");

    match issue_token(&user, &config) {
        Ok(token) => {
            info!("Login successful");
            HttpResponse::Ok()
                .cookie(token_cookie(token.clone()))
                .json(LoginResponse {
                    access_token: token,
                    token_type: "Bearer".to_string(),
                    expires_in: config.access_token_ttl,
                })
        }
        Err(e @ LoginError::MissingFields) => HttpResponse::BadRequest().body(e.to_string()),
        Err(e @ LoginError::InvalidCredentials) => HttpResponse::Unauthorized().body(e.to_string()),
        Err(LoginError::Internal) => HttpResponse::InternalServerError().finish(),
    }
}

// -------------------- Browser login --------------------

pub async fn login_page() -> impl Responder {
    pages::html(&LoginPage { error: None })
}

#[instrument(
    name = "auth_login_form",
    skip(config, form),
    fields(username = %form.username)
)]
pub async fn login_form(form: web::Form<LoginReqDto>, config: web::Data<Config>) -> impl Responder {
    match issue_token(&form, &config) {
        Ok(token) => {
            info!("Login successful");
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/"))
                .cookie(token_cookie(token))
                .finish()
        }
        Err(LoginError::Internal) => HttpResponse::InternalServerError().finish(),
        Err(e) => {
            let message = e.to_string();
            let mut resp = pages::html(&LoginPage {
                error: Some(&message),
            });
            if resp.status().is_success() {
                *resp.status_mut() = StatusCode::UNAUTHORIZED;
            }
            resp
        }
    }
}

pub async fn logout() -> impl Responder {
    let mut cookie = token_cookie(String::new());
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/login"))
        .cookie(cookie)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::json;

    #[actix_web::test]
    async fn json_login_returns_token_and_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .route("/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "admin", "password": "1234"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().any(|c| c.name() == TOKEN_COOKIE));

        let body: LoginResponse = test::read_body_json(resp).await;
        assert_eq!(body.token_type, "Bearer");
        assert!(!body.access_token.is_empty());
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .route("/auth/login", web::post().to(login)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "admin", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn form_login_redirects_to_dashboard() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .route("/login", web::post().to(login_form)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "admin"), ("password", "1234")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[actix_web::test]
    async fn failed_form_login_shows_the_error() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests()))
                .route("/login", web::post().to(login_form)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "admin"), ("password", "nope")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("Invalid credentials"));
    }

    #[actix_web::test]
    async fn blank_fields_are_rejected_before_hashing() {
        let config = Config::for_tests();
        let user = LoginReqDto {
            username: " ".into(),
            password: "".into(),
        };
        assert_eq!(issue_token(&user, &config), Err(LoginError::MissingFields));
    }
}
