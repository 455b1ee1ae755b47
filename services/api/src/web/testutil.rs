//! services/api/src/web/testutil.rs
//!
//! In-memory implementations of the storage ports plus small helpers, so the
//! handlers can be exercised without a running Postgres.

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::web::auth::SignupRequest;
use crate::web::state::AppState;
use bhasha_core::{
    CoreError, CoreResult, IdentityStore, Language, NewUser, Progress, ProgressStore, User,
};

pub const TEST_SECRET: &str = "test-secret";

/// An in-memory stand-in for the database adapter. Counts every storage call
/// so tests can assert that validation short-circuits before storage access.
#[derive(Default)]
pub struct MockDb {
    users: Mutex<Vec<User>>,
    progress: Mutex<HashMap<(String, String), i32>>,
    calls: AtomicUsize,
}

impl MockDb {
    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn storage_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn only_user_id(&self) -> Uuid {
        let users = self.users.lock().unwrap();
        assert_eq!(users.len(), 1, "expected exactly one user");
        users[0].id
    }

    pub fn progress_record_count(&self) -> usize {
        self.progress.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityStore for MockDb {
    async fn create_user(&self, new: NewUser) -> CoreResult<User> {
        self.touch();
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(CoreError::Conflict(
                "User with provided username/email already exists.".to_string(),
            ));
        }
        let user = User {
            id: Uuid::new_v4(),
            fullname: new.fullname,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            age: new.age,
            native_language: new.native_language,
            learning_language: new.learning_language,
            specially_abled: new.specially_abled,
            created_at: chrono::Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        self.touch();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        self.touch();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        self.touch();
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ProgressStore for MockDb {
    async fn get_progress(&self, user_id: &str, level_file: &str)
        -> CoreResult<Option<Progress>> {
        self.touch();
        Ok(self
            .progress
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), level_file.to_string()))
            .map(|&last_lesson| Progress {
                user_id: user_id.to_string(),
                level_file: level_file.to_string(),
                last_lesson,
            }))
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        level_file: &str,
        last_lesson: i32,
    ) -> CoreResult<Progress> {
        self.touch();
        self.progress
            .lock()
            .unwrap()
            .insert((user_id.to_string(), level_file.to_string()), last_lesson);
        Ok(Progress {
            user_id: user_id.to_string(),
            level_file: level_file.to_string(),
            last_lesson,
        })
    }
}

/// Builds a fresh mock-backed [`AppState`].
pub fn test_state() -> (Arc<MockDb>, Arc<AppState>) {
    let db = Arc::new(MockDb::default());
    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: String::new(),
        log_level: tracing::Level::INFO,
        jwt_secret: TEST_SECRET.to_string(),
        cookie_secure: false,
        cors_origin: "http://localhost:5173".to_string(),
    });
    let state = Arc::new(AppState {
        identity: db.clone(),
        progress: db.clone(),
        config,
    });
    (db, state)
}

/// A well-formed signup request; tests tweak individual fields as needed.
pub fn signup_request(username: &str, email: &str) -> SignupRequest {
    SignupRequest {
        fullname: "Asha Rao".to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        age: 22,
        native_language: Language::Hindi,
        learning_language: Language::English,
        specially_abled: false,
    }
}

/// Collapses a handler result into the response the client would see.
pub fn respond<T: IntoResponse>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(ok) => ok.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Reads a response body back as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
