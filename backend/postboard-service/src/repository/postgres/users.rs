use super::is_unique_violation;
use crate::domain::models::{NewUser, ProfileChanges, User};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::UserRepository;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const EMAIL_TAKEN: &str = "The email has already been taken.";

/// Repository for User operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_email_conflict(err: sqlx::Error) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Validation(EMAIL_TAKEN.to_string())
    } else {
        ServiceError::Database(err)
    }
}

#[async_trait::async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, profile_image, created_at, updated_at
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)
    }

    async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, profile_image, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    async fn get_users(&self, user_ids: &[Uuid]) -> ServiceResult<HashMap<Uuid, User>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, profile_image, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn update_profile(&self, user_id: Uuid, changes: ProfileChanges) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                profile_image = COALESCE($4, profile_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, profile_image, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.profile_image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_email_conflict)?
        .ok_or_else(|| ServiceError::not_found("User", user_id))
    }
}
