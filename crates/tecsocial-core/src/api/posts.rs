//! Post endpoints. Thin wrappers over [`SessionClient::authenticated_request`];
//! errors pass through untouched.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::{Id, Post};

use super::{ApiError, SessionClient};

/// Page size the recent-posts screen asks for.
pub const RECENT_POSTS_LIMIT: u32 = 35;

/// Page size the followed-users feed asks for.
pub const FOLLOWED_POSTS_LIMIT: u32 = 25;

/// Page size for a single user's posts.
pub const USER_POSTS_LIMIT: u32 = 10;

/// Pull a post list out of a list response.
///
/// Accepts a bare array or an object with a `posts` array. Anything else is
/// treated as an empty page.
pub(crate) fn post_list(value: Value) -> Result<Vec<Post>, ApiError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("posts") {
            Some(Value::Array(items)) => items,
            _ => {
                debug!("List response carried no posts array");
                return Ok(Vec::new());
            }
        },
        _ => return Ok(Vec::new()),
    };
    serde_json::from_value(Value::Array(items))
        .map_err(|e| ApiError::InvalidResponse(format!("post list: {}", e)))
}

fn post_path(id: &Id) -> String {
    format!("/posts/{}", id)
}

impl SessionClient {
    // ===== Post Methods =====

    /// Most recent posts from everyone
    pub async fn recent_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        let path = format!("/posts?page={}&limit={}", page, limit);
        post_list(self.authenticated_request(&path, Method::GET, None).await?)
    }

    /// Posts from users the current user follows
    pub async fn followed_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        let path = format!("/feed?page={}&limit={}", page, limit);
        post_list(self.authenticated_request(&path, Method::GET, None).await?)
    }

    pub async fn create_post(&self, content: &str, image: Option<&str>) -> Result<Value, ApiError> {
        self.authenticated_request(
            "/posts",
            Method::POST,
            Some(json!({ "content": content, "image": image })),
        )
        .await
    }

    pub async fn edit_post(
        &self,
        id: &Id,
        content: &str,
        image: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.authenticated_request(
            &post_path(id),
            Method::PATCH,
            Some(json!({ "content": content, "image": image })),
        )
        .await
    }

    pub async fn delete_post(&self, id: &Id) -> Result<Value, ApiError> {
        self.authenticated_request(&post_path(id), Method::DELETE, Some(json!({})))
            .await
    }

    pub async fn like_post(&self, id: &Id) -> Result<Value, ApiError> {
        let path = format!("{}/like", post_path(id));
        self.authenticated_request(&path, Method::PUT, Some(json!({})))
            .await
    }

    pub async fn unlike_post(&self, id: &Id) -> Result<Value, ApiError> {
        let path = format!("{}/like", post_path(id));
        self.authenticated_request(&path, Method::DELETE, Some(json!({})))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_list_accepts_array_and_wrapped() {
        let posts = post_list(json!([{"id": 1, "content": "a"}])).unwrap();
        assert_eq!(posts.len(), 1);

        let posts = post_list(json!({"posts": [{"id": 2, "content": "b"}], "total": 1})).unwrap();
        assert_eq!(posts[0].content, "b");
    }

    #[test]
    fn test_post_list_non_list_is_empty() {
        assert!(post_list(json!({})).unwrap().is_empty());
        assert!(post_list(json!({"message": "no posts"})).unwrap().is_empty());
        assert!(post_list(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_post_list_rejects_malformed_posts() {
        assert!(matches!(
            post_list(json!([{"id": 1}])),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_post_path() {
        assert_eq!(post_path(&Id::from(5)), "/posts/5");
        assert_eq!(post_path(&Id::from("abc")), "/posts/abc");
    }
}
