use std::sync::Arc;

use shelf_auth::token::TokenManager;
use shelf_dal::Pool;
use url::Url;

use crate::rest_api::paging::PageLimits;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool, tokens: TokenManager) -> Self {
        AppState {
            state: Arc::new(AppStateInner {
                pool,
                app_config,
                tokens,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.state.tokens
    }

    /// Absolute URL for path on this server, base URL path prefix is kept
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.config().base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    tokens: TokenManager,
}

pub struct AppConfig {
    pub base_url: Url,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl AppConfig {
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_size: self.default_page_size.clamp(1, self.max_page_size.max(1)),
            max_size: self.max_page_size.max(1),
        }
    }
}
