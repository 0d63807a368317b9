//! Configuration model loaded from external sources.

use serde::Deserialize;

use crate::services::gallery::GalleryOptions;

fn default_per_page() -> usize {
    crate::DEFAULT_PER_PAGE
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_list_stale_secs() -> u64 {
    30
}

fn default_lookup_stale_secs() -> u64 {
    300
}

fn default_session_ttl_hours() -> i64 {
    168
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for talking to the admin backend.
pub struct AdminConfig {
    /// Base URL of the backend, e.g. `https://shop.example.com/api`.
    pub api_base_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How long a cached list page is reused before being fetched again.
    #[serde(default = "default_list_stale_secs")]
    pub list_stale_secs: u64,
    #[serde(default = "default_lookup_stale_secs")]
    pub lookup_stale_secs: u64,
    #[serde(default)]
    pub gallery: GalleryOptions,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl AdminConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            per_page: default_per_page(),
            request_timeout_secs: default_request_timeout_secs(),
            list_stale_secs: default_list_stale_secs(),
            lookup_stale_secs: default_lookup_stale_secs(),
            gallery: GalleryOptions::default(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }

    pub fn list_stale_after(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.list_stale_secs)
    }

    pub fn lookup_stale_after(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.lookup_stale_secs)
    }
}
