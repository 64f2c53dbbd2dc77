use serde::{Deserialize, Serialize};

use super::{Id, User};

/// One like as the backend encodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Like {
    UserId(Id),
    Record {
        #[serde(default)]
        user_id: Option<Id>,
        #[serde(default)]
        id: Option<Id>,
    },
}

impl Like {
    /// The liking user's id, if the encoding carries one.
    pub fn user_id(&self) -> Option<&Id> {
        match self {
            Like::UserId(id) => Some(id),
            Like::Record { user_id, id } => user_id.as_ref().or(id.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Id,
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
}

impl Post {
    /// Ids of every user who liked this post, whatever the encoding.
    pub fn liker_ids(&self) -> Vec<Id> {
        self.likes.iter().filter_map(Like::user_id).cloned().collect()
    }
}

/// A post as shown to the current user, with like state resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub post: Post,
    pub likes: Vec<Id>,
    pub is_liked: bool,
}

impl FeedPost {
    pub fn from_post(post: Post, current_user: Option<&User>) -> Self {
        let likes = post.liker_ids();
        let is_liked = current_user
            .map(|u| likes.iter().any(|id| *id == u.id))
            .unwrap_or(false);
        Self {
            post,
            likes,
            is_liked,
        }
    }

    pub fn from_posts(posts: Vec<Post>, current_user: Option<&User>) -> Vec<Self> {
        posts
            .into_iter()
            .map(|p| Self::from_post(p, current_user))
            .collect()
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Reflect a successful like call. Liking twice leaves one entry.
    pub fn apply_like(&mut self, user_id: &Id) {
        if !self.likes.contains(user_id) {
            self.likes.push(user_id.clone());
        }
        self.is_liked = true;
    }

    /// Reflect a successful unlike call.
    pub fn apply_unlike(&mut self, user_id: &Id) {
        self.likes.retain(|id| id != user_id);
        self.is_liked = false;
    }

    pub fn apply_edit(&mut self, content: &str, image: Option<&str>) {
        self.post.content = content.to_string();
        self.post.image = image.map(str::to_string);
    }
}
