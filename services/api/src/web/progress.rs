//! services/api/src/web/progress.rs
//!
//! Lesson-progress endpoints: point lookup with a zero-value default, and an
//! atomic create-or-overwrite keyed on (user, level file).
//!
//! These routes are deliberately unauthenticated; the progress key is whatever
//! user identifier the client presents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;
use bhasha_core::{CoreError, Progress};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveProgressRequest {
    pub user_id: String,
    pub level_file: String,
    /// No range or monotonicity check: a client may overwrite with a smaller
    /// value to rewind.
    pub last_lesson: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub user_id: String,
    pub level_file: String,
    pub last_lesson: i32,
}

impl From<Progress> for ProgressView {
    fn from(progress: Progress) -> Self {
        Self {
            user_id: progress.user_id,
            level_file: progress.level_file,
            last_lesson: progress.last_lesson,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProgressResponse {
    pub last_lesson: i32,
}

#[derive(Serialize, ToSchema)]
pub struct SaveProgressResponse {
    pub message: String,
    pub progress: ProgressView,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/progress/{userId}/{levelFile} - Fetch progress for one level file
#[utoipa::path(
    get,
    path = "/api/progress/{user_id}/{level_file}",
    params(
        ("user_id" = String, Path, description = "User identifier"),
        ("level_file" = String, Path, description = "Level file, e.g. swar.json")
    ),
    responses(
        (status = 200, description = "Last completed lesson; 0 if never saved", body = GetProgressResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_progress_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, level_file)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    debug!(%user_id, %level_file, "fetching progress");

    // "No progress yet" is a valid state, reported as lesson 0.
    let last_lesson = state
        .progress
        .get_progress(&user_id, &level_file)
        .await?
        .map(|p| p.last_lesson)
        .unwrap_or(0);

    Ok((StatusCode::OK, Json(GetProgressResponse { last_lesson })))
}

/// POST /api/progress - Create or update progress for one level file
#[utoipa::path(
    post,
    path = "/api/progress",
    request_body = SaveProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = SaveProgressResponse),
        (status = 400, description = "Missing userId or levelFile"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_progress_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveProgressRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id.is_empty() || req.level_file.is_empty() {
        return Err(CoreError::Validation("Missing userId or levelFile".to_string()).into());
    }

    debug!(user_id = %req.user_id, level_file = %req.level_file, last_lesson = req.last_lesson,
        "saving progress");

    let progress = state
        .progress
        .upsert_progress(&req.user_id, &req.level_file, req.last_lesson)
        .await?;

    Ok((
        StatusCode::OK,
        Json(SaveProgressResponse {
            message: "Progress saved successfully".to_string(),
            progress: progress.into(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::auth::{login_handler, signup_handler, LoginRequest};
    use crate::web::testutil::{body_json, respond, signup_request, test_state};
    use axum::http::StatusCode;

    fn save_request(user_id: &str, level_file: &str, last_lesson: i32) -> SaveProgressRequest {
        SaveProgressRequest {
            user_id: user_id.to_string(),
            level_file: level_file.to_string(),
            last_lesson,
        }
    }

    async fn fetch(state: &std::sync::Arc<crate::web::state::AppState>, user: &str, file: &str) -> i32 {
        let response = respond(
            get_progress_handler(
                State(state.clone()),
                Path((user.to_string(), file.to_string())),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["lastLesson"].as_i64().unwrap() as i32
    }

    #[tokio::test]
    async fn never_saved_pair_reads_back_as_zero() {
        let (_db, state) = test_state();
        assert_eq!(fetch(&state, "asha", "swar.json").await, 0);
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let (_db, state) = test_state();
        let response = respond(
            save_progress_handler(State(state.clone()), Json(save_request("asha", "swar.json", 5)))
                .await,
        );
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["progress"]["lastLesson"], 5);

        assert_eq!(fetch(&state, "asha", "swar.json").await, 5);
    }

    #[tokio::test]
    async fn repeated_saves_keep_a_single_record() {
        let (db, state) = test_state();
        for _ in 0..2 {
            respond(
                save_progress_handler(
                    State(state.clone()),
                    Json(save_request("asha", "swar.json", 3)),
                )
                .await,
            );
        }
        assert_eq!(db.progress_record_count(), 1);
        assert_eq!(fetch(&state, "asha", "swar.json").await, 3);
    }

    #[tokio::test]
    async fn a_later_save_overwrites_even_with_a_smaller_value() {
        let (_db, state) = test_state();
        respond(
            save_progress_handler(State(state.clone()), Json(save_request("asha", "swar.json", 7)))
                .await,
        );
        respond(
            save_progress_handler(State(state.clone()), Json(save_request("asha", "swar.json", 2)))
                .await,
        );
        assert_eq!(fetch(&state, "asha", "swar.json").await, 2);
    }

    #[tokio::test]
    async fn missing_identifiers_are_rejected() {
        let (db, state) = test_state();
        for (user, file) in [("", "swar.json"), ("asha", "")] {
            let response = respond(
                save_progress_handler(State(state.clone()), Json(save_request(user, file, 1)))
                    .await,
            );
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(db.progress_record_count(), 0);
    }

    #[tokio::test]
    async fn progress_is_keyed_per_level_file() {
        let (_db, state) = test_state();
        respond(
            save_progress_handler(State(state.clone()), Json(save_request("asha", "swar.json", 4)))
                .await,
        );
        assert_eq!(fetch(&state, "asha", "swar.json").await, 4);
        assert_eq!(fetch(&state, "asha", "vyanjan.json").await, 0);
    }

    // The end-to-end walk from the product side: signup, login, save, read.
    #[tokio::test]
    async fn asha_signs_up_logs_in_and_tracks_progress() {
        let (_db, state) = test_state();

        let response = respond(
            signup_handler(
                State(state.clone()),
                Json(signup_request("asha", "asha@example.com")),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["user"]["username"], "asha");

        let response = respond(
            login_handler(
                State(state.clone()),
                Json(LoginRequest {
                    username: "asha".to_string(),
                    password: "password123".to_string(),
                }),
            )
            .await,
        );
        assert_eq!(response.status(), StatusCode::OK);

        let response = respond(
            save_progress_handler(State(state.clone()), Json(save_request("asha", "swar.json", 2)))
                .await,
        );
        assert_eq!(body_json(response).await["progress"]["lastLesson"], 2);

        assert_eq!(fetch(&state, "asha", "swar.json").await, 2);
        assert_eq!(fetch(&state, "asha", "vyanjan.json").await, 0);
    }
}
