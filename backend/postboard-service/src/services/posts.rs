/// Post service - listing, creation, editing and deletion of posts
///
/// Uploaded files are stored before the row is written and removed again if
/// the write fails. Files replaced or orphaned by an update or delete are
/// removed after the row change succeeds; a failed removal is logged only.
use crate::domain::models::{
    Actor, AuthorSummary, NewPost, Page, Post, PostChanges, PostSummary,
};
use crate::domain::{permissions, validation};
use crate::error::ServiceResult;
use crate::repository::Store;
use media_storage::{FileStorage, MediaUpload};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const POSTS_PER_PAGE: u32 = 5;

const POST_MEDIA_DIR: &str = "posts";

#[derive(Debug, Clone)]
pub struct NewPostInput {
    pub title: String,
    pub content: String,
    pub image: Option<MediaUpload>,
    pub images: Vec<MediaUpload>,
}

/// Post edit; `None` media keeps the current files, `Some` replaces them
#[derive(Debug, Clone)]
pub struct PostChangesInput {
    pub title: String,
    pub content: String,
    pub image: Option<MediaUpload>,
    pub images: Option<Vec<MediaUpload>>,
}

#[derive(Clone)]
pub struct PostService {
    store: Store,
    storage: Arc<dyn FileStorage>,
}

impl PostService {
    pub fn new(store: Store, storage: Arc<dyn FileStorage>) -> Self {
        Self { store, storage }
    }

    /// Latest-first page of posts, optionally filtered by `search`
    ///
    /// Pages are 1-based; page 0 is treated as page 1.
    pub async fn list_posts(
        &self,
        search: Option<&str>,
        page: u32,
        viewer: Option<&Actor>,
    ) -> ServiceResult<Page<PostSummary>> {
        let page = page.max(1);
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let limit = i64::from(POSTS_PER_PAGE);
        let offset = i64::from(page - 1) * limit;

        let (posts, total) = self.store.posts.list_posts(search, limit, offset).await?;
        let items = summarize_posts(&self.store, posts, viewer).await?;

        Ok(Page::new(items, page, POSTS_PER_PAGE, total))
    }

    pub async fn create_post(&self, actor: &Actor, input: NewPostInput) -> ServiceResult<Post> {
        let title = validation::post_title(&input.title)?;
        let content = validation::post_content(&input.content)?;
        if let Some(image) = &input.image {
            validation::image_upload(image, "image")?;
        }
        validation::gallery_uploads(&input.images)?;

        let mut stored = Vec::new();
        let image = match &input.image {
            Some(upload) => Some(self.store_file(upload, &mut stored).await?),
            None => None,
        };
        let mut images = Vec::with_capacity(input.images.len());
        for upload in &input.images {
            images.push(self.store_file(upload, &mut stored).await?);
        }

        let result = self
            .store
            .posts
            .insert_post(NewPost {
                user_id: actor.id,
                title,
                content,
                image,
                images,
            })
            .await;

        match result {
            Ok(post) => {
                info!(post_id = %post.id, user_id = %actor.id, files = stored.len(), "Post created");
                Ok(post)
            }
            Err(e) => {
                self.remove_files(&stored).await;
                Err(e)
            }
        }
    }

    pub async fn update_post(
        &self,
        actor: &Actor,
        post_id: Uuid,
        input: PostChangesInput,
    ) -> ServiceResult<Post> {
        let existing = self.store.posts.get_post(post_id).await?;
        permissions::ensure(
            permissions::can_edit_post(actor, &existing),
            "You can only edit your own posts.",
        )?;

        let title = validation::post_title(&input.title)?;
        let content = validation::post_content(&input.content)?;
        if let Some(image) = &input.image {
            validation::image_upload(image, "image")?;
        }
        if let Some(images) = &input.images {
            validation::gallery_uploads(images)?;
        }

        let mut stored = Vec::new();
        let image = match &input.image {
            Some(upload) => Some(self.store_file(upload, &mut stored).await?),
            None => None,
        };
        let images = match &input.images {
            Some(uploads) => {
                let mut paths = Vec::with_capacity(uploads.len());
                for upload in uploads {
                    paths.push(self.store_file(upload, &mut stored).await?);
                }
                Some(paths)
            }
            None => None,
        };

        let result = self
            .store
            .posts
            .update_post(
                post_id,
                PostChanges {
                    title,
                    content,
                    image,
                    images,
                },
            )
            .await;

        let updated = match result {
            Ok(post) => post,
            Err(e) => {
                self.remove_files(&stored).await;
                return Err(e);
            }
        };

        let kept: HashSet<String> = updated.media_paths().into_iter().collect();
        let replaced: Vec<String> = existing
            .media_paths()
            .into_iter()
            .filter(|path| !kept.contains(path))
            .collect();
        self.remove_files(&replaced).await;

        info!(post_id = %post_id, user_id = %actor.id, replaced_files = replaced.len(), "Post updated");
        Ok(updated)
    }

    /// Delete a post with its comments, likes and stored files
    pub async fn delete_post(&self, actor: &Actor, post_id: Uuid) -> ServiceResult<()> {
        let post = self.store.posts.get_post(post_id).await?;
        permissions::ensure(
            permissions::can_delete_post(actor, &post),
            "You can only delete your own posts.",
        )?;

        self.store.posts.delete_post(post_id).await?;
        self.remove_files(&post.media_paths()).await;

        info!(post_id = %post_id, user_id = %actor.id, "Post deleted");
        Ok(())
    }

    async fn store_file(
        &self,
        upload: &MediaUpload,
        stored: &mut Vec<String>,
    ) -> ServiceResult<String> {
        match self.storage.store(POST_MEDIA_DIR, upload).await {
            Ok(path) => {
                stored.push(path.clone());
                Ok(path)
            }
            Err(e) => {
                self.remove_files(stored).await;
                Err(e.into())
            }
        }
    }

    async fn remove_files(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                warn!(path = %path, error = %e, "Failed to delete stored file");
            }
        }
    }
}

/// Attach authors, counters and the viewer's like state to a batch of posts
pub(crate) async fn summarize_posts(
    store: &Store,
    posts: Vec<Post>,
    viewer: Option<&Actor>,
) -> ServiceResult<Vec<PostSummary>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let author_ids: Vec<Uuid> = posts
        .iter()
        .map(|p| p.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors = store.users.get_users(&author_ids).await?;
    let like_counts = store.likes.count_post_likes(&post_ids).await?;
    let comment_counts = store.comments.count_post_comments(&post_ids).await?;
    let liked = match viewer {
        Some(actor) => store.likes.liked_post_ids(actor.id, &post_ids).await?,
        None => HashSet::new(),
    };

    Ok(posts
        .into_iter()
        .map(|post| PostSummary {
            author: authors
                .get(&post.user_id)
                .map(AuthorSummary::from)
                .unwrap_or_else(|| AuthorSummary::unknown(post.user_id)),
            like_count: like_counts.get(&post.id).copied().unwrap_or(0),
            comment_count: comment_counts.get(&post.id).copied().unwrap_or(0),
            is_liked_by_viewer: liked.contains(&post.id),
            post,
        })
        .collect())
}
