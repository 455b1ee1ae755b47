//! crates/bhasha_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of languages the platform supports, both as a learner's
/// native language and as the language being learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Hindi,
    English,
    Marathi,
    Other,
}

impl Language {
    /// Canonical string form, also used for the database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::English => "English",
            Language::Marathi => "Marathi",
            Language::Other => "Other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hindi" => Ok(Language::Hindi),
            "English" => Ok(Language::English),
            "Marathi" => Ok(Language::Marathi),
            "Other" => Ok(Language::Other),
            other => Err(format!("'{}' is not a supported language", other)),
        }
    }
}

/// A registered learner. `password_hash` holds the salted argon2 hash,
/// never a plaintext password.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub native_language: Language,
    pub learning_language: Language,
    pub specially_abled: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new user. The password hash is derived before this
/// struct is built, so a hashing failure never leaves a partial row behind.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub native_language: Language,
    pub learning_language: Language,
    pub specially_abled: bool,
}

/// One learner's furthest position within one lesson file.
///
/// `user_id` is a plain string rather than a foreign key: progress is keyed
/// by whatever identifier the client presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub user_id: String,
    pub level_file: String,
    pub last_lesson: i32,
}
