//! Entity store
//!
//! One trait per entity, injected as `Arc<dyn ...>`. Lookups by id return
//! `ServiceError::NotFound` when the id does not resolve. Authorization is not
//! checked here.
//!
//! Backends:
//! - [`postgres`]: PostgreSQL via sqlx, schema in `migrations/`
//! - [`memory`]: in-process store for tests and local development

pub mod memory;
pub mod postgres;

use crate::domain::models::{
    Comment, LikeOutcome, NewComment, NewPost, NewUser, Post, PostChanges, ProfileChanges, User,
};
use crate::error::ServiceResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::{PgCommentRepository, PgLikeRepository, PgPostRepository, PgUserRepository};

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a taken email is a validation error
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User>;

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User>;

    /// Batch lookup; ids that do not resolve are absent from the map
    async fn get_users(&self, user_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, User>>;

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> ServiceResult<User>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, new_post: NewPost) -> ServiceResult<Post>;

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Post>;

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> ServiceResult<Post>;

    /// Delete a post together with its comments and likes
    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<()>;

    /// Latest-first page of posts; `search` matches title, content or author name
    /// Returns: (posts, total_matching)
    async fn list_posts(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Post>, i64)>;

    /// All posts of a user, latest first
    async fn list_user_posts(&self, user_id: Uuid) -> ServiceResult<Vec<Post>>;

    async fn count_user_posts(&self, user_id: Uuid) -> ServiceResult<i64>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(&self, new_comment: NewComment) -> ServiceResult<Comment>;

    async fn get_comment(&self, comment_id: Uuid) -> ServiceResult<Comment>;

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> ServiceResult<Comment>;

    /// Delete a comment together with its replies
    async fn delete_comment(&self, comment_id: Uuid) -> ServiceResult<()>;

    /// Every comment on a post (all levels), oldest first
    async fn list_post_comments(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>>;

    /// Top-level comments plus replies to them, per post
    async fn count_post_comments(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>>;
}

#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    /// Remove the (user, post) like if present, otherwise insert it, as one
    /// atomic unit guarded by the (user_id, post_id) unique constraint
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<LikeOutcome>;

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool>;

    /// Subset of `post_ids` the user has liked
    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid])
        -> ServiceResult<HashSet<Uuid>>;

    async fn count_post_likes(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>>;

    /// Likes received across every post owned by the user
    async fn count_likes_received(&self, user_id: Uuid) -> ServiceResult<i64>;
}

/// Handles to every repository, shared by the services
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store.clone(),
            likes: store,
        }
    }
}
