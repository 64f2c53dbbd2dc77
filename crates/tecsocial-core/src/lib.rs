//! Core library for tecsocial.
//!
//! - `api`: `SessionClient`, errors, the server wake-up loop, post/user endpoints
//! - `auth`: `Session` and the stores it is persisted in
//! - `models`: users, profiles, posts and like reconciliation
//! - `progress`: observers for retry progress
//! - `config`: backend location and retry tuning

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod progress;

pub use api::{ApiError, SessionClient};
pub use auth::{FileSessionStore, KeyringSessionStore, MemorySessionStore, Session, SessionStore};
pub use config::Config;
pub use progress::{Interest, NoProgress, ProgressObserver, ProgressState};
