/// Comment thread builder - reads a post's comments into a two-level tree
use crate::domain::models::CommentThread;
use crate::domain::thread::assemble_thread;
use crate::error::ServiceResult;
use crate::repository::Store;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone)]
pub struct ThreadBuilder {
    store: Store,
}

impl ThreadBuilder {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Build the thread of a post; NotFound when the post does not exist
    ///
    /// Threads are public: no viewer is needed and nothing is authorized here.
    pub async fn build_thread(&self, post_id: Uuid) -> ServiceResult<CommentThread> {
        self.store.posts.get_post(post_id).await?;
        self.collect(post_id).await
    }

    /// Thread assembly for a post already known to exist
    pub(crate) async fn collect(&self, post_id: Uuid) -> ServiceResult<CommentThread> {
        let comments = self.store.comments.list_post_comments(post_id).await?;

        let author_ids: Vec<Uuid> = comments
            .iter()
            .map(|c| c.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors = self.store.users.get_users(&author_ids).await?;

        Ok(assemble_thread(comments, &authors))
    }
}
