//! REST API client module for the tec social network backend.
//!
//! This module provides the `SessionClient`, which owns the login session
//! and wakes a cold-started server before exchanging credentials, plus the
//! post and user endpoint wrappers built on top of it.
//!
//! Authenticated calls carry the session token as a bearer credential.

pub mod client;
pub mod error;
pub mod posts;
pub mod retry;
pub mod users;

pub use client::SessionClient;
pub use error::ApiError;
pub use reqwest::Method;
pub use retry::{Backoff, ProbeState, RetryPolicy};
