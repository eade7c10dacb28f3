/// Profile service - public profile pages and self-service profile edits
use crate::domain::models::{Actor, AuthorSummary, ProfileChanges, ProfileView, User};
use crate::domain::validation;
use crate::error::ServiceResult;
use crate::repository::Store;
use crate::services::posts::summarize_posts;
use media_storage::{FileStorage, MediaUpload};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const PROFILE_MEDIA_DIR: &str = "profile-images";

#[derive(Debug, Clone)]
pub struct ProfileChangesInput {
    pub name: String,
    pub email: String,
    pub profile_image: Option<MediaUpload>,
}

#[derive(Clone)]
pub struct ProfileService {
    store: Store,
    storage: Arc<dyn FileStorage>,
}

impl ProfileService {
    pub fn new(store: Store, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    /// Profile page of any user; `viewer` only decides `is_own_profile`
    /// and the per-post like state
    pub async fn get_public_profile(
        &self,
        user_id: Uuid,
        viewer: Option<&Actor>,
    ) -> ServiceResult<ProfileView> {
        let user = self.store.users.get_user(user_id).await?;

        let posts = self.store.posts.list_user_posts(user_id).await?;
        let posts_count = self.store.posts.count_user_posts(user_id).await?;
        let total_likes = self.store.likes.count_likes_received(user_id).await?;
        let posts = summarize_posts(&self.store, posts, viewer).await?;

        Ok(ProfileView {
            user: AuthorSummary::from(&user),
            member_since: user.created_at,
            posts,
            posts_count,
            total_likes,
            is_own_profile: viewer.map(|v| v.id == user_id).unwrap_or(false),
        })
    }

    /// Update the actor's own profile
    pub async fn update_profile(
        &self,
        actor: &Actor,
        input: ProfileChangesInput,
    ) -> ServiceResult<User> {
        let existing = self.store.users.get_user(actor.id).await?;

        let name = validation::profile_name(&input.name)?;
        let email = validation::profile_email(&input.email)?;
        if let Some(image) = &input.profile_image {
            validation::image_upload(image, "profile_image")?;
        }

        let profile_image = match &input.profile_image {
            Some(upload) => Some(self.storage.store(PROFILE_MEDIA_DIR, upload).await?),
            None => None,
        };

        let result = self
            .store
            .users
            .update_profile(
                actor.id,
                ProfileChanges {
                    name,
                    email,
                    profile_image: profile_image.clone(),
                },
            )
            .await;

        let updated = match result {
            Ok(user) => user,
            Err(e) => {
                if let Some(path) = &profile_image {
                    self.remove_file(path).await;
                }
                return Err(e);
            }
        };

        if profile_image.is_some() {
            if let Some(previous) = &existing.profile_image {
                self.remove_file(previous).await;
            }
        }

        info!(user_id = %actor.id, image_replaced = profile_image.is_some(), "Profile updated");
        Ok(updated)
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!(path = %path, error = %e, "Failed to delete stored file");
        }
    }
}
