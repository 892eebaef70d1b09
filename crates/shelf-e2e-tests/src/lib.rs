use std::path::Path;

use anyhow::{Result, anyhow};
use rand::Rng as _;
use reqwest::{
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use shelf_app::state::AppState;
use shelf_dal::user::{CreateUser, UserRepository};
use shelf_server::config::{Parser, ServerConfig};
use shelf_types::claim::{ApiClaim, Role};
use tempfile::TempDir;
use tracing::debug;

pub mod rest;

pub const TEST_PASSWORD: &str = "password";

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, std::time::Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(
    test_name: &str,
    base_dir: &Path,
    base_url: Option<&str>,
) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = base_url
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://localhost:{}", port));
    let args = &[
        "shelf-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    test_config(test_name, &std::env::temp_dir(), None)
}

/// Environment where links are generated for given public base URL
pub async fn prepare_env_with_base_url(
    test_name: &str,
    base_url: &str,
) -> Result<(ServerConfig, ConfigGuard)> {
    test_config(test_name, &std::env::temp_dir(), Some(base_url))
}

/// Address where test server actually listens
pub fn server_url(args: &ServerConfig) -> Url {
    Url::parse(&format!("http://127.0.0.1:{}/", args.port)).expect("valid server url")
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    url.path_segments_mut()
        .expect("base url")
        .push(&segment.to_string());
    url
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestUser {
    Anonymous,
    User,
    Admin,
}

impl TestUser {
    fn role(&self) -> Option<Role> {
        match self {
            TestUser::Anonymous => None,
            TestUser::User => Some(Role::User),
            TestUser::Admin => Some(Role::Admin),
        }
    }

    pub fn email(&self) -> String {
        match self {
            TestUser::Anonymous => "anonymous@example.com".to_string(),
            TestUser::User => "user@example.com".to_string(),
            TestUser::Admin => "admin@example.com".to_string(),
        }
    }
}

/// Creates user directly in database and returns signed token for it
pub async fn create_user_token(state: &AppState, user: TestUser) -> Result<Option<String>> {
    let Some(role) = user.role() else {
        return Ok(None);
    };
    let repository = UserRepository::new(state.pool().clone());
    let created = repository
        .create_with_role(
            CreateUser {
                email: user.email(),
                given_name: "Test".to_string(),
                family_name: format!("{role}"),
                password: TEST_PASSWORD.to_string(),
            },
            role,
        )
        .await?;
    let token = state
        .tokens()
        .issue(ApiClaim::new(created.id.to_string(), role))?;
    Ok(Some(token))
}

pub fn client_with_token(token: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
    }
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

async fn wait_for_server(url: &Url) -> Result<()> {
    let health = url.join("health")?;
    for _ in 0..50 {
        match reqwest::get(health.clone()).await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(_) | Err(_) => tokio::time::sleep(std::time::Duration::from_millis(50)).await,
        }
    }
    Err(anyhow!("Server did not start"))
}

/// Starts server in background and returns client acting as given user
pub async fn launch_env(args: ServerConfig, user: TestUser) -> Result<(reqwest::Client, AppState)> {
    let url = server_url(&args);
    let state = shelf_server::build_state(&args).await?;
    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = shelf_server::run_graceful_with_state(
            args,
            server_state,
            futures::future::pending::<()>(),
        )
        .await
        {
            tracing::error!("Test server failed: {e}");
        }
    });
    wait_for_server(&url).await?;
    debug!("Test server ready at {url}");

    let token = create_user_token(&state, user).await?;
    let client = client_with_token(token.as_deref())?;
    Ok((client, state))
}
