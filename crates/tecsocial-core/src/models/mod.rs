//! Data models for the social network.
//!
//! - `User`, `Profile`: account records
//! - `Post`, `Like`: posts as the API sends them
//! - `FeedPost`: a post with like state resolved for the current user
//! - `Id`: identifiers that arrive as numbers or strings

pub mod id;
pub mod post;
pub mod user;

pub use id::Id;
pub use post::{FeedPost, Like, Post};
pub use user::{Profile, User};
