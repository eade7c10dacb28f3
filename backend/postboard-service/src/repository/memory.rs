//! In-process store
//!
//! Implements every repository trait over one lock-protected state so that
//! cascades and the like toggle behave like the PostgreSQL backend. Timestamps
//! are strictly increasing, which keeps creation-time ordering deterministic.

use crate::domain::models::{
    Comment, Like, LikeOutcome, NewComment, NewPost, NewUser, Post, PostChanges, ProfileChanges,
    User,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{CommentRepository, LikeRepository, PostRepository, UserRepository};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    likes: HashMap<(Uuid, Uuid), Like>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    /// Comments counted for a post: top-level ones and replies to them
    fn counted_comments(&self, post_id: Uuid) -> i64 {
        self.comments
            .values()
            .filter(|c| c.post_id == post_id)
            .filter(|c| match c.parent_id {
                None => true,
                Some(parent_id) => self
                    .comments
                    .get(&parent_id)
                    .map(|p| p.parent_id.is_none() && p.post_id == post_id)
                    .unwrap_or(false),
            })
            .count() as i64
    }

    fn remove_comment_tree(&mut self, comment_id: Uuid) {
        let children: Vec<Uuid> = self
            .comments
            .values()
            .filter(|c| c.parent_id == Some(comment_id))
            .map(|c| c.id)
            .collect();
        for child in children {
            self.remove_comment_tree(child);
        }
        self.comments.remove(&comment_id);
    }
}

fn sort_latest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored like rows for a (user, post) pair
    pub async fn like_rows(&self, user_id: Uuid, post_id: Uuid) -> usize {
        let state = self.state.read().await;
        state
            .likes
            .keys()
            .filter(|(u, p)| *u == user_id && *p == post_id)
            .count()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        let mut state = self.state.write().await;
        if state.email_taken(&new_user.email, None) {
            return Err(ServiceError::Validation(
                "The email has already been taken.".to_string(),
            ));
        }

        let now = state.next_timestamp();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        let state = self.state.read().await;
        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    async fn get_users(&self, user_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, User>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.clone())))
            .collect())
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> ServiceResult<User> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(ServiceError::not_found("User", user_id));
        }
        if state.email_taken(&changes.email, Some(user_id)) {
            return Err(ServiceError::Validation(
                "The email has already been taken.".to_string(),
            ));
        }

        let now = state.next_timestamp();
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;
        user.name = changes.name;
        user.email = changes.email;
        if let Some(image) = changes.profile_image {
            user.profile_image = Some(image);
        }
        user.updated_at = now;
        Ok(user.clone())
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, new_post: NewPost) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&new_post.user_id) {
            return Err(ServiceError::not_found("User", new_post.user_id));
        }

        let now = state.next_timestamp();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: new_post.user_id,
            title: new_post.title,
            content: new_post.content,
            image: new_post.image,
            images: new_post.images,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        let state = self.state.read().await;
        state
            .posts
            .get(&post_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> ServiceResult<Post> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let post = state
            .posts
            .get_mut(&post_id)
            .ok_or_else(|| ServiceError::not_found("Post", post_id))?;

        post.title = changes.title;
        post.content = changes.content;
        if let Some(image) = changes.image {
            post.image = Some(image);
        }
        if let Some(images) = changes.images {
            post.images = images;
        }
        post.updated_at = now;
        Ok(post.clone())
    }

    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        if state.posts.remove(&post_id).is_none() {
            return Err(ServiceError::not_found("Post", post_id));
        }
        state.comments.retain(|_, c| c.post_id != post_id);
        state.likes.retain(|(_, p), _| *p != post_id);
        Ok(())
    }

    async fn list_posts(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Post>, i64)> {
        let state = self.state.read().await;
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matching: Vec<Post> = state
            .posts
            .values()
            .filter(|post| match &needle {
                None => true,
                Some(needle) => {
                    let author_matches = state
                        .users
                        .get(&post.user_id)
                        .map(|u| u.name.to_lowercase().contains(needle))
                        .unwrap_or(false);
                    post.title.to_lowercase().contains(needle)
                        || post.content.to_lowercase().contains(needle)
                        || author_matches
                }
            })
            .cloned()
            .collect();
        sort_latest_first(&mut matching);

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_user_posts(&self, user_id: Uuid) -> ServiceResult<Vec<Post>> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        sort_latest_first(&mut posts);
        Ok(posts)
    }

    async fn count_user_posts(&self, user_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state.posts.values().filter(|p| p.user_id == user_id).count() as i64)
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, new_comment: NewComment) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&new_comment.post_id) {
            return Err(ServiceError::not_found("Post", new_comment.post_id));
        }
        if let Some(parent_id) = new_comment.parent_id {
            if !state.comments.contains_key(&parent_id) {
                return Err(ServiceError::not_found("Comment", parent_id));
            }
        }

        let now = state.next_timestamp();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
            parent_id: new_comment.parent_id,
            content: new_comment.content,
            edited_at: None,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: Uuid) -> ServiceResult<Comment> {
        let state = self.state.read().await;
        state
            .comments
            .get(&comment_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("Comment", comment_id))
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> ServiceResult<Comment> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let comment = state
            .comments
            .get_mut(&comment_id)
            .ok_or_else(|| ServiceError::not_found("Comment", comment_id))?;

        comment.content = content.to_string();
        comment.edited_at = Some(edited_at);
        comment.updated_at = now;
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> ServiceResult<()> {
        let mut state = self.state.write().await;
        if !state.comments.contains_key(&comment_id) {
            return Err(ServiceError::not_found("Comment", comment_id));
        }
        state.remove_comment_tree(comment_id);
        Ok(())
    }

    async fn list_post_comments(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(comments)
    }

    async fn count_post_comments(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        Ok(post_ids
            .iter()
            .map(|id| (*id, state.counted_comments(*id)))
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}

#[async_trait::async_trait]
impl LikeRepository for MemoryStore {
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<LikeOutcome> {
        // One write guard spans the check and the mutation
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(ServiceError::not_found("Post", post_id));
        }

        if state.likes.remove(&(user_id, post_id)).is_some() {
            return Ok(LikeOutcome::Removed);
        }

        let created_at = state.next_timestamp();
        state.likes.insert(
            (user_id, post_id),
            Like {
                user_id,
                post_id,
                created_at,
            },
        );
        Ok(LikeOutcome::Inserted)
    }

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state.likes.contains_key(&(user_id, post_id)))
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> ServiceResult<HashSet<Uuid>> {
        let state = self.state.read().await;
        Ok(post_ids
            .iter()
            .filter(|post_id| state.likes.contains_key(&(user_id, **post_id)))
            .copied()
            .collect())
    }

    async fn count_post_likes(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>> {
        let state = self.state.read().await;
        let wanted: HashSet<&Uuid> = post_ids.iter().collect();
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for (_, post_id) in state.likes.keys() {
            if wanted.contains(post_id) {
                *counts.entry(*post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_likes_received(&self, user_id: Uuid) -> ServiceResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .keys()
            .filter(|(_, post_id)| {
                state
                    .posts
                    .get(post_id)
                    .map(|p| p.user_id == user_id)
                    .unwrap_or(false)
            })
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(store: &MemoryStore) -> (User, Post) {
        let user = store
            .create_user(NewUser {
                name: "alice".into(),
                email: "alice@example.com".into(),
            })
            .await
            .unwrap();
        let post = store
            .insert_post(NewPost {
                user_id: user.id,
                title: "hello".into(),
                content: "world".into(),
                image: None,
                images: vec![],
            })
            .await
            .unwrap();
        (user, post)
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let store = MemoryStore::new();
        let (user, _) = seed(&store).await;
        let mut previous = None;
        for i in 0..20 {
            let post = store
                .insert_post(NewPost {
                    user_id: user.id,
                    title: format!("p{}", i),
                    content: "c".into(),
                    image: None,
                    images: vec![],
                })
                .await
                .unwrap();
            if let Some(prev) = previous {
                assert!(post.created_at > prev);
            }
            previous = Some(post.created_at);
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        seed(&store).await;
        let result = store
            .create_user(NewUser {
                name: "other".into(),
                email: "alice@example.com".into(),
            })
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_flips_single_row() {
        let store = MemoryStore::new();
        let (user, post) = seed(&store).await;

        assert_eq!(
            store.toggle_like(user.id, post.id).await.unwrap(),
            LikeOutcome::Inserted
        );
        assert_eq!(store.like_rows(user.id, post.id).await, 1);
        assert_eq!(
            store.toggle_like(user.id, post.id).await.unwrap(),
            LikeOutcome::Removed
        );
        assert_eq!(store.like_rows(user.id, post.id).await, 0);
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = MemoryStore::new();
        let (user, post) = seed(&store).await;
        let top = store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: user.id,
                parent_id: None,
                content: "top".into(),
            })
            .await
            .unwrap();
        store.toggle_like(user.id, post.id).await.unwrap();

        store.delete_post(post.id).await.unwrap();

        assert!(matches!(
            store.get_comment(top.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(!store.has_liked(user.id, post.id).await.unwrap());
        assert!(matches!(
            store.delete_post(post.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_comment_removes_replies() {
        let store = MemoryStore::new();
        let (user, post) = seed(&store).await;
        let top = store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: user.id,
                parent_id: None,
                content: "top".into(),
            })
            .await
            .unwrap();
        let reply = store
            .insert_comment(NewComment {
                post_id: post.id,
                user_id: user.id,
                parent_id: Some(top.id),
                content: "reply".into(),
            })
            .await
            .unwrap();

        let counts = store.count_post_comments(&[post.id]).await.unwrap();
        assert_eq!(counts.get(&post.id), Some(&2));

        store.delete_comment(top.id).await.unwrap();

        assert!(store.get_comment(reply.id).await.is_err());
        assert!(store.list_post_comments(post.id).await.unwrap().is_empty());
    }
}
