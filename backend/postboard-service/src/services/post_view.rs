/// Post view aggregator
///
/// Splits a post detail view into:
/// - the post row and author, read fresh on every request
/// - the comment thread and counters, viewer-independent and cached per post
/// - `is_liked_by_viewer`, computed per request and never cached
///
/// Writes do not invalidate the cached part; it refreshes when the TTL lapses.
use crate::domain::models::{Actor, AuthorSummary, PostActivity, PostView};
use crate::error::{ServiceError, ServiceResult};
use crate::metrics::{POST_VIEW_CACHE_EVENTS, POST_VIEW_DURATION_SECONDS};
use crate::repository::Store;
use crate::services::ThreadBuilder;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;
use view_cache::{CacheKey, JsonCache};

#[derive(Clone)]
pub struct PostViewService {
    store: Store,
    threads: ThreadBuilder,
    cache: JsonCache,
    ttl: Duration,
}

impl PostViewService {
    pub fn new(store: Store, cache: JsonCache, ttl: Duration) -> Self {
        Self {
            threads: ThreadBuilder::new(store.clone()),
            store,
            cache,
            ttl,
        }
    }

    pub async fn get_post_view(
        &self,
        post_id: Uuid,
        viewer: Option<&Actor>,
    ) -> ServiceResult<PostView> {
        let started = Instant::now();

        let post = self.store.posts.get_post(post_id).await?;
        let author = match self.store.users.get_user(post.user_id).await {
            Ok(user) => AuthorSummary::from(&user),
            Err(ServiceError::NotFound(_)) => AuthorSummary::unknown(post.user_id),
            Err(e) => return Err(e),
        };

        let (activity, source) = self.load_activity(post_id).await?;

        let is_liked_by_viewer = match viewer {
            Some(actor) => self.store.likes.has_liked(actor.id, post_id).await?,
            None => false,
        };

        let elapsed = started.elapsed();
        POST_VIEW_DURATION_SECONDS
            .with_label_values(&[source])
            .observe(elapsed.as_secs_f64());
        debug!(
            post_id = %post_id,
            source,
            elapsed_ms = elapsed.as_millis() as u64,
            "Post view assembled"
        );

        Ok(PostView {
            post,
            author,
            comments: activity.comments,
            comment_count: activity.comment_count,
            like_count: activity.like_count,
            is_liked_by_viewer,
        })
    }

    /// Cached activity, rebuilt on miss
    ///
    /// Cache failures degrade to a rebuild. Concurrent misses may each
    /// rebuild; the last write wins.
    async fn load_activity(&self, post_id: Uuid) -> ServiceResult<(PostActivity, &'static str)> {
        let key = CacheKey::post_view(post_id);

        match self.cache.get::<PostActivity>(&key).await {
            Ok(Some(activity)) => {
                POST_VIEW_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                return Ok((activity, "cache"));
            }
            Ok(None) => {
                POST_VIEW_CACHE_EVENTS.with_label_values(&["miss"]).inc();
            }
            Err(e) => {
                POST_VIEW_CACHE_EVENTS.with_label_values(&["error"]).inc();
                warn!(post_id = %post_id, error = %e, "Post view cache read failed, rebuilding");
            }
        }

        let activity = self.build_activity(post_id).await?;

        if let Err(e) = self.cache.set(&key, &activity, self.ttl).await {
            warn!(post_id = %post_id, error = %e, "Post view cache write failed");
        }

        Ok((activity, "store"))
    }

    async fn build_activity(&self, post_id: Uuid) -> ServiceResult<PostActivity> {
        let thread = self.threads.collect(post_id).await?;
        let like_count = self
            .store
            .likes
            .count_post_likes(&[post_id])
            .await?
            .get(&post_id)
            .copied()
            .unwrap_or(0);

        Ok(PostActivity {
            comments: thread.nodes,
            comment_count: thread.total_count,
            like_count,
        })
    }
}
