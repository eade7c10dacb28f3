/// Comment handlers - HTTP endpoints for comment operations
use crate::error::ServiceResult;
use crate::middleware::AuthenticatedUser;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for creating a comment or reply
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

/// Request body for editing a comment
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// Comment thread of a post
pub async fn get_thread(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let thread = state.threads.build_thread(*post_id).await?;
    Ok(HttpResponse::Ok().json(thread))
}

pub async fn create_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> ServiceResult<HttpResponse> {
    let comment = state
        .comments
        .create_comment(&user.0, *post_id, &req.content, req.parent_id)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn update_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
    req: web::Json<UpdateCommentRequest>,
) -> ServiceResult<HttpResponse> {
    let comment = state
        .comments
        .update_comment(&user.0, *comment_id, &req.content)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    state.comments.delete_comment(&user.0, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
