//! User endpoints: profiles, user posts, follow/unfollow.

use reqwest::Method;
use serde_json::Value;

use crate::models::{Id, Post, Profile};

use super::posts::post_list;
use super::{ApiError, SessionClient};

impl SessionClient {
    // ===== User Methods =====

    /// Profile including whether the current user follows it
    pub async fn user_profile(&self, user_id: &Id) -> Result<Profile, ApiError> {
        self.request(&format!("/users/{}", user_id), Method::GET, None)
            .await
    }

    pub async fn user_posts(&self, user_id: &Id, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        let path = format!("/users/{}/posts?page={}&limit={}", user_id, page, limit);
        post_list(self.authenticated_request(&path, Method::GET, None).await?)
    }

    pub async fn follow_user(&self, user_id: &Id) -> Result<Value, ApiError> {
        self.authenticated_request(&format!("/users/{}/follow", user_id), Method::PUT, None)
            .await
    }

    pub async fn unfollow_user(&self, user_id: &Id) -> Result<Value, ApiError> {
        self.authenticated_request(&format!("/users/{}/follow", user_id), Method::DELETE, None)
            .await
    }

    /// Whether the current user follows `user_id`, read from the profile
    pub async fn is_user_followed(&self, user_id: &Id) -> Result<bool, ApiError> {
        Ok(self.user_profile(user_id).await?.is_following)
    }
}
