/// Comment service - creation, editing and deletion of comments and replies
use crate::domain::models::{Actor, Comment, NewComment};
use crate::domain::{permissions, validation};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Store;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

const INVALID_PARENT: &str = "The selected parent id is invalid.";

#[derive(Clone)]
pub struct CommentService {
    store: Store,
}

impl CommentService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a comment, or a reply when `parent_id` is given
    ///
    /// A reply's parent must be a top-level comment on the same post;
    /// anything else is rejected rather than re-parented.
    pub async fn create_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> ServiceResult<Comment> {
        self.store.posts.get_post(post_id).await?;
        let content = validation::comment_content(content)?;

        if let Some(parent_id) = parent_id {
            self.validate_parent(post_id, parent_id).await?;
        }

        let comment = self
            .store
            .comments
            .insert_comment(NewComment {
                post_id,
                user_id: actor.id,
                parent_id,
                content,
            })
            .await?;

        info!(
            comment_id = %comment.id,
            post_id = %post_id,
            user_id = %actor.id,
            is_reply = parent_id.is_some(),
            "Comment created"
        );
        Ok(comment)
    }

    async fn validate_parent(&self, post_id: Uuid, parent_id: Uuid) -> ServiceResult<()> {
        let parent = match self.store.comments.get_comment(parent_id).await {
            Ok(parent) => parent,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::Validation(INVALID_PARENT.to_string()))
            }
            Err(e) => return Err(e),
        };

        if parent.post_id != post_id {
            return Err(ServiceError::Validation(INVALID_PARENT.to_string()));
        }
        if !parent.is_top_level() {
            return Err(ServiceError::Validation(
                "Replies can only be added to top-level comments.".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace a comment's content and mark it edited; author only
    pub async fn update_comment(
        &self,
        actor: &Actor,
        comment_id: Uuid,
        content: &str,
    ) -> ServiceResult<Comment> {
        let comment = self.store.comments.get_comment(comment_id).await?;
        permissions::ensure(
            permissions::can_edit_comment(actor, &comment),
            "You can only edit your own comments.",
        )?;

        let content = validation::comment_content(content)?;
        let updated = self
            .store
            .comments
            .update_comment_content(comment_id, &content, Utc::now())
            .await?;

        info!(comment_id = %comment_id, user_id = %actor.id, "Comment updated");
        Ok(updated)
    }

    /// Delete a comment and its replies; author or post owner
    pub async fn delete_comment(&self, actor: &Actor, comment_id: Uuid) -> ServiceResult<()> {
        let comment = self.store.comments.get_comment(comment_id).await?;
        let post = self.store.posts.get_post(comment.post_id).await?;
        permissions::ensure(
            permissions::can_delete_comment(actor, &comment, &post),
            "You can only delete your own comments.",
        )?;

        self.store.comments.delete_comment(comment_id).await?;

        info!(
            comment_id = %comment_id,
            post_id = %post.id,
            user_id = %actor.id,
            by_post_owner = actor.id != comment.user_id,
            "Comment deleted"
        );
        Ok(())
    }
}
