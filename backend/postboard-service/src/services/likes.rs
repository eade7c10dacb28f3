/// Like toggle service
use crate::domain::models::{Actor, LikeOutcome, LikeToggle};
use crate::error::ServiceResult;
use crate::metrics::LIKE_TOGGLE_TOTAL;
use crate::repository::Store;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeService {
    store: Store,
}

impl LikeService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Like the post if the actor has not, otherwise remove the like
    ///
    /// The check-and-mutate runs atomically in the store. A unique-constraint
    /// conflict on insert means a concurrent request already liked the post and
    /// is reported as `liked: true`. Like counts are not touched here; they are
    /// derived at read time.
    pub async fn toggle_like(&self, actor: &Actor, post_id: Uuid) -> ServiceResult<LikeToggle> {
        self.store.posts.get_post(post_id).await?;

        let liked = match self.store.likes.toggle_like(actor.id, post_id).await? {
            LikeOutcome::Inserted => true,
            LikeOutcome::Removed => false,
            LikeOutcome::AlreadyPresent => {
                debug!(user_id = %actor.id, post_id = %post_id, "Concurrent like resolved as already liked");
                true
            }
        };

        LIKE_TOGGLE_TOTAL
            .with_label_values(&[if liked { "liked" } else { "unliked" }])
            .inc();
        info!(user_id = %actor.id, post_id = %post_id, liked, "Like toggled");

        Ok(LikeToggle { liked })
    }
}
