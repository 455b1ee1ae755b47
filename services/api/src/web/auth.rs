//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout, and resolving the
//! current user from the session cookie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::token::{self, SESSION_TTL_SECS};
use crate::web::middleware::{AuthenticatedUser, SESSION_COOKIE};
use crate::web::state::AppState;
use bhasha_core::{CoreError, Language, NewUser, User};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignupRequest {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    #[schema(value_type = String, example = "Hindi")]
    pub native_language: Language,
    #[schema(value_type = String, example = "English")]
    pub learning_language: Language,
    #[serde(default)]
    pub specially_abled: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Minimal public view returned by signup.
#[derive(Serialize, ToSchema)]
pub struct SignupUserView {
    pub username: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: SignupUserView,
}

#[derive(Serialize, ToSchema)]
pub struct LoginUserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUserView,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The subset of a user record that is safe to return to a client. Never
/// includes the password hash.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub age: i32,
    #[schema(value_type = String)]
    pub native_language: Language,
    #[schema(value_type = String)]
    pub learning_language: Language,
    pub specially_abled: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname,
            username: user.username,
            email: user.email,
            age: user.age,
            native_language: user.native_language,
            learning_language: user.learning_language,
            specially_abled: user.specially_abled,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserView,
}

//=========================================================================================
// Cookie Construction
//=========================================================================================

/// Builds the `Set-Cookie` value carrying a freshly minted session token.
fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_SECS,
        if secure { "; Secure" } else { "" }
    )
}

/// Builds the `Set-Cookie` value that overwrites the session cookie with an
/// immediately expiring empty value.
fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created; session cookie set", body = SignupResponse),
        (status = 400, description = "Short password, invalid age, or duplicate username/email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Input validation happens before any storage access.
    if req.password.len() < 8 {
        return Err(CoreError::Validation(
            "Password must be at least 8 characters long.".to_string(),
        )
        .into());
    }
    if req.age == 0 {
        return Err(CoreError::Validation("Age must be a positive integer.".to_string()).into());
    }

    // Username conflict is reported even if the email is also taken.
    if state
        .identity
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(
            "Username already exists. Please choose a different one.".to_string(),
        )
        .into());
    }
    if state
        .identity
        .find_user_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(
            "Email already exists. Please choose a different one.".to_string(),
        )
        .into());
    }

    // Hash before persisting, so a hashing failure leaves no row behind.
    let password_hash = hash_password(&req.password)?;

    let user = state
        .identity
        .create_user(NewUser {
            fullname: req.fullname,
            username: req.username,
            email: req.email,
            password_hash,
            age: req.age as i32,
            native_language: req.native_language,
            learning_language: req.learning_language,
            specially_abled: req.specially_abled,
        })
        .await?;

    let token = token::mint(user.id, &state.config.jwt_secret)?;
    let cookie = session_cookie(&token, state.config.cookie_secure);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SignupResponse {
            message: "User created successfully.".to_string(),
            user: SignupUserView {
                username: user.username,
            },
        }),
    ))
}

/// POST /api/auth/login - Authenticate a returning user
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = LoginResponse),
        (status = 404, description = "No user with that username"),
        (status = 401, description = "Wrong password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .identity
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(|| CoreError::NotFound("User not found.".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| ApiError::Internal(format!("stored password hash is invalid: {e}")))?;
    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(CoreError::Authentication("Invalid password.".to_string()).into());
    }

    // A fresh credential is minted on every successful login.
    let token = token::mint(user.id, &state.config.jwt_secret)?;
    let cookie = session_cookie(&token, state.config.cookie_secure);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful.".to_string(),
            user: LoginUserView {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

/// GET /api/auth/logout - Discard the client's session cookie
#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Cookie cleared", body = MessageResponse)
    )
)]
pub async fn logout_handler() -> impl IntoResponse {
    // Stateless: the server keeps no revocation list, so this only instructs
    // the client to drop its copy of the credential.
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse {
            message: "Logged out successfully.".to_string(),
        }),
    )
}

/// GET /api/auth/me - Resolve the session cookie back to a user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = MeResponse),
        (status = 401, description = "Missing, invalid, or expired credential"),
        (status = 500, description = "Lookup fault")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    // A valid token whose subject row is gone (deleted account) is reported
    // distinctly from "not authenticated", but still as a 401.
    let user = state
        .identity
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| CoreError::Authentication("Account no longer exists.".to_string()))?;

    Ok((StatusCode::OK, Json(MeResponse { user: user.into() })))
}
