/// Authorization rules for posts and comments
///
/// Pure ownership checks. Services call these before any mutation and return
/// `PermissionDenied` without touching the store when a check fails.
use crate::domain::models::{Actor, Comment, Post};
use crate::error::{ServiceError, ServiceResult};

/// Only the author may edit a comment
pub fn can_edit_comment(actor: &Actor, comment: &Comment) -> bool {
    actor.id == comment.user_id
}

/// The author, or the owner of the post the comment is on, may delete it
pub fn can_delete_comment(actor: &Actor, comment: &Comment, post: &Post) -> bool {
    actor.id == comment.user_id || actor.id == post.user_id
}

pub fn can_edit_post(actor: &Actor, post: &Post) -> bool {
    actor.id == post.user_id
}

pub fn can_delete_post(actor: &Actor, post: &Post) -> bool {
    actor.id == post.user_id
}

/// Turn a failed rule into `PermissionDenied`
pub fn ensure(allowed: bool, message: &str) -> ServiceResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(ServiceError::PermissionDenied(message.to_string()))
    }
}
