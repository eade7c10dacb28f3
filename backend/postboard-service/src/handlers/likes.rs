use crate::error::ServiceResult;
use crate::middleware::AuthenticatedUser;
use crate::AppState;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// Toggle the caller's like on a post; responds with `{"liked": bool}`
pub async fn toggle_like(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> ServiceResult<HttpResponse> {
    let toggle = state.likes.toggle_like(&user.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(toggle))
}
