use super::is_foreign_key_violation;
use crate::domain::models::LikeOutcome;
use crate::error::{ServiceError, ServiceResult};
use crate::repository::LikeRepository;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// Repository for Like operations
#[derive(Clone)]
pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LikeRepository for PgLikeRepository {
    async fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<LikeOutcome> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed > 0 {
            tx.commit().await?;
            return Ok(LikeOutcome::Removed);
        }

        // A concurrent toggle may have inserted since the DELETE; the unique
        // constraint turns that into zero affected rows instead of a duplicate.
        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (user_id, post_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ServiceError::not_found("Post", post_id)
            } else {
                ServiceError::Database(e)
            }
        })?
        .rows_affected();

        tx.commit().await?;

        if inserted > 0 {
            Ok(LikeOutcome::Inserted)
        } else {
            debug!(%user_id, %post_id, "Like insert hit unique constraint");
            Ok(LikeOutcome::AlreadyPresent)
        }
    }

    async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE user_id = $1 AND post_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn liked_post_ids(
        &self,
        user_id: Uuid,
        post_ids: &[Uuid],
    ) -> ServiceResult<HashSet<Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT post_id
            FROM likes
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }

    async fn count_post_likes(&self, post_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, i64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT post_id, COUNT(*)
            FROM likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }

    async fn count_likes_received(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM likes l
            JOIN posts p ON p.id = l.post_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
