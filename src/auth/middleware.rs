use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    web::Data,
};
use serde_json::json;

/// Cookie carrying the admin token for the browser dashboard.
pub const TOKEN_COOKIE: &str = "attendance_token";

/// Bearer header first, then the dashboard cookie.
fn request_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

fn authenticate(req: &ServiceRequest) -> Result<AuthUser, String> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| "App config missing".to_string())?;
    let token = request_token(req).ok_or_else(|| "Missing token".to_string())?;
    let claims = verify_token(&token, &config.jwt_secret)?;

    if claims.sub != config.admin_username {
        return Err("Unknown admin".to_string());
    }

    Ok(AuthUser {
        username: claims.sub,
    })
}

/// JSON API guard: 401 when no valid admin token is present.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    match authenticate(&req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(e) => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "Invalid or expired token", "details": e}));
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}

/// Page guard: sends the browser to the login form instead of a 401.
pub async fn page_auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    match authenticate(&req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(_) => {
            let resp = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login"))
                .finish();
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
