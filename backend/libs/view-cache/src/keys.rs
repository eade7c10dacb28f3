//! Cache key schema
//!
//! Key format: v{VERSION}:{entity}:{identifier}

use uuid::Uuid;

/// Cache schema version - increment when changing key formats or cached payloads
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Viewer-independent post activity (comment thread + counters)
    /// Format: v1:post_view:{post_id}
    pub fn post_view(post_id: Uuid) -> String {
        format!("v{}:post_view:{}", CACHE_VERSION, post_id)
    }

    /// Entity segment of a key, used as the metrics label
    pub fn entity(key: &str) -> &str {
        key.split(':').nth(1).unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_view_key_format() {
        let id = Uuid::nil();
        assert_eq!(
            CacheKey::post_view(id),
            "v1:post_view:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_entity_extraction() {
        assert_eq!(CacheKey::entity("v1:post_view:abc"), "post_view");
        assert_eq!(CacheKey::entity("garbage"), "unknown");
    }
}
