use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use media_storage::{FileStorage, LocalDiskStorage, S3Config, S3Storage};
use postboard_service::config::{Config, MediaBackend, StoreBackend};
use postboard_service::handlers;
use postboard_service::repository::Store;
use postboard_service::AppState;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use view_cache::{CacheMetrics, CacheStore, InMemoryCache, JsonCache, RedisCache};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_store(config: &Config) -> Result<Store> {
    match (config.store.backend, &config.store.database) {
        (StoreBackend::Postgres, Some(database)) => {
            // Prepared statement caching disabled for PgBouncer transaction mode
            let connect_options = PgConnectOptions::from_str(&database.url)
                .context("Failed to parse DATABASE_URL")?
                .statement_cache_capacity(0);

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
                .connect_with(connect_options)
                .await
                .context("Failed to connect to PostgreSQL")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Database connected and migrations applied");

            Ok(Store::postgres(pool))
        }
        (StoreBackend::Postgres, None) => {
            anyhow::bail!("postgres store selected without database configuration")
        }
        (StoreBackend::Memory, _) => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Store::memory())
        }
    }
}

async fn build_cache(config: &Config) -> Result<JsonCache> {
    let store: Arc<dyn CacheStore> = match &config.cache.redis_url {
        Some(url) => {
            let redis = RedisCache::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            info!("Post view cache backed by Redis");
            Arc::new(redis)
        }
        None => {
            info!("REDIS_URL not set, using in-process post view cache");
            Arc::new(InMemoryCache::new())
        }
    };
    Ok(JsonCache::new(store))
}

async fn build_storage(config: &Config) -> Result<Arc<dyn FileStorage>> {
    let storage: Arc<dyn FileStorage> = match config.media.backend {
        MediaBackend::Local => {
            tokio::fs::create_dir_all(&config.media.root)
                .await
                .with_context(|| format!("Failed to create media root {}", config.media.root))?;
            Arc::new(LocalDiskStorage::new(&config.media.root))
        }
        MediaBackend::S3 => Arc::new(S3Storage::from_env(S3Config::from_env()).await),
    };
    Ok(storage)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting postboard-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        store = ?config.store.backend,
        media = ?config.media.backend,
        "Configuration loaded"
    );

    if let Err(e) = CacheMetrics::register(prometheus::default_registry()) {
        warn!(error = %e, "Failed to register cache metrics");
    }

    let store = build_store(&config).await?;
    let cache = build_cache(&config).await?;
    let storage = build_storage(&config).await?;
    let state = AppState::new(
        store,
        cache,
        storage,
        Duration::from_secs(config.cache.post_view_ttl_secs),
    );

    let bind_addr = (config.app.host.clone(), config.app.http_port);
    info!(host = %bind_addr.0, port = bind_addr.1, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("postboard-service stopped");
    Ok(())
}
