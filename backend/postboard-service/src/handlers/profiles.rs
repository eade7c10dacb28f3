/// Profile handlers - public profile page and own-profile edits
use crate::error::ServiceResult;
use crate::handlers::multipart::read_form;
use crate::middleware::{AuthenticatedUser, OptionalUser};
use crate::services::ProfileChangesInput;
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn get_profile(
    state: web::Data<AppState>,
    viewer: OptionalUser,
    user_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let profile = state
        .profiles
        .get_public_profile(*user_id, viewer.actor())
        .await?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Update `name`, `email` and optionally `profile_image` of the caller
pub async fn update_profile(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ServiceResult<HttpResponse> {
    let mut form = read_form(payload).await?;
    let input = ProfileChangesInput {
        name: form.text("name"),
        email: form.text("email"),
        profile_image: form.take_file("profile_image"),
    };

    let user = state.profiles.update_profile(&user.0, input).await?;
    Ok(HttpResponse::Ok().json(user))
}
