use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Id;

/// User record returned alongside a token at login/signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Fields the client does not interpret but keeps in the session
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Public profile of any user, as seen by the logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_following: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Reflect a successful follow/unfollow call.
    pub fn apply_follow(&mut self, following: bool) {
        self.is_following = following;
    }
}
