pub mod domain;
pub mod ports;

pub use domain::{Language, NewUser, Progress, User};
pub use ports::{CoreError, CoreResult, IdentityStore, ProgressStore};
