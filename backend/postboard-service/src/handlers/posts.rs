/// Post handlers - listing, detail view and post writes
use crate::error::ServiceResult;
use crate::handlers::multipart::read_form;
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::services::{NewPostInput, PostChangesInput};
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

/// List posts, latest first, five per page
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: OptionalUser,
    query: web::Query<ListPostsQuery>,
) -> ServiceResult<HttpResponse> {
    let page = state
        .posts
        .list_posts(
            query.search.as_deref(),
            query.page.unwrap_or(1),
            viewer.actor(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Post detail with its comment thread and like state
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: OptionalUser,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let view = state
        .post_views
        .get_post_view(*post_id, viewer.actor())
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

/// Create a post from `title`, `content`, optional `image` and `images[]`
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ServiceResult<HttpResponse> {
    let mut form = read_form(payload).await?;
    let input = NewPostInput {
        title: form.text("title"),
        content: form.text("content"),
        image: form.take_file("image"),
        images: form.take_files("images").unwrap_or_default(),
    };

    let post = state.posts.create_post(&user.0, input).await?;
    Ok(HttpResponse::Created().json(post))
}

/// Edit a post; omitted file fields keep the current files
pub async fn update_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    payload: Multipart,
) -> ServiceResult<HttpResponse> {
    let mut form = read_form(payload).await?;
    let input = PostChangesInput {
        title: form.text("title"),
        content: form.text("content"),
        image: form.take_file("image"),
        images: form.take_files("images"),
    };

    let post = state.posts.update_post(&user.0, *post_id, input).await?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    state.posts.delete_post(&user.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
