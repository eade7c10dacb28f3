//! Shared fixtures: in-memory store, in-process cache, temp-dir file storage
#![allow(dead_code)]

use media_storage::{FileStorage, LocalDiskStorage, MediaUpload};
use postboard_service::domain::models::{Actor, NewPost, NewUser, Post, User};
use postboard_service::repository::{MemoryStore, Store};
use postboard_service::AppState;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use view_cache::{InMemoryCache, JsonCache};

pub const TEST_TTL: Duration = Duration::from_secs(60);

pub struct TestContext {
    pub memory: Arc<MemoryStore>,
    pub store: Store,
    pub cache: Arc<InMemoryCache>,
    pub storage: Arc<LocalDiskStorage>,
    pub state: AppState,
    // Keeps the media directory alive for the test
    pub media_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let memory = Arc::new(MemoryStore::new());
        let store = Store::from_memory(memory.clone());
        let cache = Arc::new(InMemoryCache::new());
        let media_dir = tempfile::tempdir().expect("create temp media dir");
        let storage = Arc::new(LocalDiskStorage::new(media_dir.path()));

        let state = AppState::new(
            store.clone(),
            JsonCache::new(cache.clone()),
            storage.clone() as Arc<dyn FileStorage>,
            TEST_TTL,
        );

        Self {
            memory,
            store,
            cache,
            storage,
            state,
            media_dir,
        }
    }

    pub async fn user(&self, name: &str) -> (User, Actor) {
        let user = self
            .store
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .expect("create user");
        let actor = Actor::from(&user);
        (user, actor)
    }

    pub async fn post(&self, author: &User, title: &str) -> Post {
        self.store
            .posts
            .insert_post(NewPost {
                user_id: author.id,
                title: title.to_string(),
                content: format!("{} body", title),
                image: None,
                images: Vec::new(),
            })
            .await
            .expect("create post")
    }

    pub async fn file_exists(&self, path: &str) -> bool {
        self.storage.exists(path).await.expect("check file")
    }
}

pub fn png(name: &str) -> MediaUpload {
    MediaUpload::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}
