//! Session persistence.
//!
//! This module provides:
//! - `Session`: bearer token plus the logged-in user
//! - `SessionStore`: the durable single slot a session lives in
//! - `FileSessionStore`, `KeyringSessionStore`, `MemorySessionStore`
//!
//! Sessions have no client-side expiry; the server decides, and a 401/403
//! clears the slot.

pub mod credentials;
pub mod session;

pub use credentials::KeyringSessionStore;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
