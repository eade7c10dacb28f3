//! PostgreSQL repositories
//!
//! Runtime-checked sqlx queries against the schema in `migrations/`. Deletes
//! rely on `ON DELETE CASCADE` for comments, replies and likes.

mod comments;
mod likes;
mod posts;
mod users;

pub use comments::PgCommentRepository;
pub use likes::PgLikeRepository;
pub use posts::PgPostRepository;
pub use users::PgUserRepository;

/// Escape LIKE wildcards in user input and wrap it for substring matching
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
