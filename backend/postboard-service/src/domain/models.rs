use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - owns posts, comments and likes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post entity - `image` is the cover, `images` the ordered gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Every stored file referenced by this post
    pub fn media_paths(&self) -> Vec<String> {
        self.image
            .iter()
            .chain(self.images.iter())
            .cloned()
            .collect()
    }
}

/// Comment entity - `parent_id` links a reply to its top-level comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Like entity - unique per (user_id, post_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user performing a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor::new(user.id, user.name.clone())
    }
}

/// Public author fields embedded in posts and comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub profile_image: Option<String>,
}

impl AuthorSummary {
    /// Placeholder for an author row that no longer resolves
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "Unknown user".to_string(),
            profile_image: None,
        }
    }
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

// ============================================================================
// Store inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub images: Vec<String>,
}

/// Post update; `None` media fields keep the current files
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub content: String,
}

/// Profile update; `None` keeps the current profile image
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
}

/// Result of an atomic like toggle at the store level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// No like existed; one was inserted
    Inserted,
    /// The insert hit the unique constraint: a concurrent request already liked
    AlreadyPresent,
    /// An existing like was removed
    Removed,
}

// ============================================================================
// Read models
// ============================================================================

/// Response of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub liked: bool,
}

/// One comment with its author and (for top-level comments) its replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub author: AuthorSummary,
    pub is_edited: bool,
    pub replies: Vec<CommentNode>,
}

/// Two-level comment tree of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentThread {
    pub nodes: Vec<CommentNode>,
    /// Top-level comments plus all their replies
    pub total_count: i64,
}

/// Viewer-independent part of a post view; this is what gets cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostActivity {
    pub comments: Vec<CommentNode>,
    pub comment_count: i64,
    pub like_count: i64,
}

/// Post detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: AuthorSummary,
    pub comments: Vec<CommentNode>,
    pub comment_count: i64,
    pub like_count: i64,
    pub is_liked_by_viewer: bool,
}

/// Post as shown in listings and on profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post: Post,
    pub author: AuthorSummary,
    pub like_count: i64,
    pub comment_count: i64,
    pub is_liked_by_viewer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let per_page_total = i64::from(per_page.max(1));
        let last_page = ((total + per_page_total - 1) / per_page_total).max(1) as u32;
        Self {
            items,
            page,
            per_page,
            total,
            last_page,
        }
    }
}

/// Public profile page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub user: AuthorSummary,
    pub member_since: DateTime<Utc>,
    pub posts: Vec<PostSummary>,
    pub posts_count: i64,
    /// Likes received across all of the user's posts
    pub total_likes: i64,
    pub is_own_profile: bool,
}
