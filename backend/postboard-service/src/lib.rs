/// Postboard Service Library
///
/// Posts, threaded comments, likes and public profiles.
///
/// # Modules
///
/// - `domain`: Entities, read models, permission rules, validation, thread assembly
/// - `repository`: Entity store traits with PostgreSQL and in-memory backends
/// - `services`: Business logic layer
/// - `handlers`: HTTP request handlers
/// - `middleware`: Request identity extraction
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus metrics
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};

use media_storage::FileStorage;
use repository::Store;
use services::{
    CommentService, LikeService, PostService, PostViewService, ProfileService, ThreadBuilder,
};
use std::sync::Arc;
use std::time::Duration;
use view_cache::JsonCache;

/// Services shared by every HTTP worker
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub posts: PostService,
    pub post_views: PostViewService,
    pub comments: CommentService,
    pub threads: ThreadBuilder,
    pub likes: LikeService,
    pub profiles: ProfileService,
}

impl AppState {
    pub fn new(
        store: Store,
        cache: JsonCache,
        storage: Arc<dyn FileStorage>,
        post_view_ttl: Duration,
    ) -> Self {
        Self {
            posts: PostService::new(store.clone(), storage.clone()),
            post_views: PostViewService::new(store.clone(), cache, post_view_ttl),
            comments: CommentService::new(store.clone()),
            threads: ThreadBuilder::new(store.clone()),
            likes: LikeService::new(store.clone()),
            profiles: ProfileService::new(store.clone(), storage),
            store,
        }
    }
}
