use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::services::students::StudentDirectory;

/// Look up a student by roll number
#[utoipa::path(
    get,
    path = "/api/student/{roll_no}",
    params(
        ("roll_no" = String, Path, description = "Roll number, case-insensitive")
    ),
    responses(
        (status = 200, description = "Student entry as loaded from the directory", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found", body = Object, example = json!({
            "error": "Student not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Students"
)]
pub async fn get_student(
    _auth: AuthUser,
    path: web::Path<String>,
    students: web::Data<StudentDirectory>,
) -> impl Responder {
    match students.get(&path) {
        Some(student) => HttpResponse::Ok().json(student),
        None => HttpResponse::NotFound().json(json!({ "error": "Student not found" })),
    }
}
