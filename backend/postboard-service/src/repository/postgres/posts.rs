use super::{is_foreign_key_violation, like_pattern};
use crate::domain::models::{NewPost, Post, PostChanges};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::PostRepository;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Post operations
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostRepository for PgPostRepository {
    async fn insert_post(&self, new_post: NewPost) -> ServiceResult<Post> {
        let user_id = new_post.user_id;
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, title, content, image, images)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, content, image, images, created_at, updated_at
            "#,
        )
        .bind(new_post.user_id)
        .bind(new_post.title)
        .bind(new_post.content)
        .bind(new_post.image)
        .bind(new_post.images)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ServiceError::not_found("User", user_id)
            } else {
                ServiceError::Database(e)
            }
        })
    }

    async fn get_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, image, images, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> ServiceResult<Post> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2,
                content = $3,
                image = COALESCE($4, image),
                images = COALESCE($5, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, content, image, images, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.image)
        .bind(changes.images)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Post", post_id))
    }

    async fn delete_post(&self, post_id: Uuid) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("Post", post_id));
        }
        Ok(())
    }

    async fn list_posts(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<(Vec<Post>, i64)> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.user_id, p.title, p.content, p.image, p.images, p.created_at, p.updated_at
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE $1::text IS NULL
               OR p.title ILIKE $1
               OR p.content ILIKE $1
               OR u.name ILIKE $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE $1::text IS NULL
               OR p.title ILIKE $1
               OR p.content ILIKE $1
               OR u.name ILIKE $1
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((posts, total))
    }

    async fn list_user_posts(&self, user_id: Uuid) -> ServiceResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, content, image, images, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn count_user_posts(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
