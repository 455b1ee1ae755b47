//! services/api/src/web/rest.rs
//!
//! The master OpenAPI definition for the HTTP surface, plus the JSON 404
//! fallback for unknown paths.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use utoipa::OpenApi;

use crate::web::auth;
use crate::web::progress;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        progress::get_progress_handler,
        progress::save_progress_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::SignupResponse,
            auth::SignupUserView,
            auth::LoginResponse,
            auth::LoginUserView,
            auth::MessageResponse,
            auth::MeResponse,
            auth::UserView,
            progress::SaveProgressRequest,
            progress::GetProgressResponse,
            progress::SaveProgressResponse,
            progress::ProgressView,
        )
    ),
    tags(
        (name = "Bhasha API", description = "Authentication and lesson-progress endpoints for the language-learning client.")
    )
)]
pub struct ApiDoc;

/// Fallback for any route the router does not know.
pub async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Not found" })),
    )
}
