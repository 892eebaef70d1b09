use std::time::Duration;

use crate::error::Result;
pub use clap::Parser;
use shelf_app::state::AppConfig;
use shelf_types::config::BackendConfig;
use url::Url;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about)]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "SHELF_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "SHELF_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "SHELF_BASE_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of server as visible to clients, used in Location and Link headers"
    )]
    pub base_url: Url,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "SHELF_TOKEN_VALIDITY",
        default_value = "1 day",
        help = "Access token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub token_validity: Duration,

    #[arg(
        long,
        env = "SHELF_DEFAULT_PAGE_SIZE",
        default_value = "25",
        help = "Page size used when request does not set per"
    )]
    pub default_page_size: u32,

    #[arg(
        long,
        env = "SHELF_MAX_PAGE_SIZE",
        default_value = "100",
        help = "Maximum page size, larger per values are clamped"
    )]
    pub max_page_size: u32,

    #[arg(long, env = "SHELF_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }
}

impl From<&ServerConfig> for AppConfig {
    fn from(config: &ServerConfig) -> Self {
        AppConfig {
            base_url: config.base_url.clone(),
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }
}
