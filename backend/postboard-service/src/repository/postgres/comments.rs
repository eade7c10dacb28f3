use super::is_foreign_key_violation;
use crate::domain::models::{Comment, NewComment};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::CommentRepository;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Repository for Comment operations
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CommentRepository for PgCommentRepository {
    async fn insert_comment(&self, new_comment: NewComment) -> ServiceResult<Comment> {
        let post_id = new_comment.post_id;
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, parent_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, post_id, user_id, parent_id, content, edited_at, created_at, updated_at
            "#,
        )
        .bind(new_comment.post_id)
        .bind(new_comment.user_id)
        .bind(new_comment.parent_id)
        .bind(new_comment.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The post (or parent) vanished between the service checks and the insert
            if is_foreign_key_violation(&e) {
                ServiceError::not_found("Post", post_id)
            } else {
                ServiceError::Database(e)
            }
        })
    }

    async fn get_comment(&self, comment_id: Uuid) -> ServiceResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, edited_at, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Comment", comment_id))
    }

    async fn update_comment_content(
        &self,
        comment_id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> ServiceResult<Comment> {
        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $2, edited_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, post_id, user_id, parent_id, content, edited_at, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(content)
        .bind(edited_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Comment", comment_id))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Comment", comment_id));
        }
        Ok(())
    }

    async fn list_post_comments(&self, post_id: Uuid) -> ServiceResult<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, parent_id, content, edited_at, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn count_post_comments(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT c.post_id, COUNT(*)
            FROM comments c
            LEFT JOIN comments parent ON parent.id = c.parent_id
            WHERE c.post_id = ANY($1)
              AND (
                c.parent_id IS NULL
                OR (parent.parent_id IS NULL AND parent.post_id = c.post_id)
              )
            GROUP BY c.post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
