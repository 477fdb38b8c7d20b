use crate::services::api_client::ApiClient;

pub const CACHE_SIZE_FAILED: &str = "Failed to fetch cache size";
pub const CACHE_CLEAR_FAILED: &str = "Failed to clear cache";

/// Storage cache size display with a clear button. Errors stay in this
/// panel and never touch alert or statistics state.
pub struct CachePanel {
    api: ApiClient,
    size_mb: Option<f64>,
    clearing: bool,
    error: Option<String>,
}

impl CachePanel {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            size_mb: None,
            clearing: false,
            error: None,
        }
    }

    pub fn size_mb(&self) -> Option<f64> {
        self.size_mb
    }

    pub fn size_label(&self) -> String {
        match self.size_mb {
            Some(mb) => format!("{:.2} MB", mb),
            None => "-".to_string(),
        }
    }

    pub fn clearing(&self) -> bool {
        self.clearing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn refresh(&mut self) {
        match self.api.cache_size().await {
            Ok(mb) => {
                tracing::debug!("cache size: {} MB", mb);
                self.size_mb = Some(mb);
            }
            Err(e) => {
                tracing::error!("error fetching cache size: {}", e);
                self.error = Some(CACHE_SIZE_FAILED.to_string());
            }
        }
    }

    pub async fn clear(&mut self) {
        self.clearing = true;

        match self.api.clear_cache().await {
            Ok(()) => self.refresh().await,
            Err(e) => {
                tracing::error!("error clearing cache: {}", e);
                self.error = Some(CACHE_CLEAR_FAILED.to_string());
            }
        }

        self.clearing = false;
    }
}
