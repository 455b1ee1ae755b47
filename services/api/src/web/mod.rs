pub mod auth;
pub mod middleware;
pub mod progress;
pub mod rest;
pub mod state;

#[cfg(test)]
mod testutil;

// Re-export the handlers and middleware the server binary wires together.
pub use auth::{login_handler, logout_handler, me_handler, signup_handler};
pub use middleware::require_auth;
pub use progress::{get_progress_handler, save_progress_handler};
