use std::path::Path;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use shelf_app::state::{AppConfig, AppState};
use tokio::{fs, io::AsyncWriteExt as _};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const SECRET_LEN: usize = 64;

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    debug!("Server stopped");
    Ok(())
}

pub fn main_router(state: AppState) -> Router<()> {
    Router::new()
        .nest("/api", shelf_app::rest_api::api_router())
        .with_state(state)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.backend.ensure_data_dir()?;
    let app_config: AppConfig = config.into();

    let pool = shelf_dal::new_pool(&config.backend.database_url()).await?;
    shelf_dal::migrate(&pool).await?;
    info!("Database ready");

    let secret = read_secret(&data_dir).await?;
    if secret.len() != SECRET_LEN {
        return Err(Error::InvalidSecret(format!(
            "expected {SECRET_LEN} bytes, found {}",
            secret.len()
        )));
    }
    let tokens = shelf_auth::token::TokenManager::new(&secret, config.token_validity)?;
    Ok(AppState::new(app_config, pool, tokens))
}

async fn read_secret(data_dir: &Path) -> Result<Vec<u8>, std::io::Error> {
    let secret_file = data_dir.join("secret");

    let secret = if fs::try_exists(&secret_file).await? {
        fs::read(&secret_file).await?
    } else {
        let random_bytes = rand::random::<[u8; SECRET_LEN]>();
        #[cfg(unix)]
        let mut file = {
            use std::fs::OpenOptions;
            use std::os::unix::fs::OpenOptionsExt;
            {
                // only the current user may read the secret
                let _f = OpenOptions::new()
                    .mode(0o600)
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&secret_file)?;
            }
            fs::File::options().write(true).open(&secret_file).await?
        };
        #[cfg(not(unix))]
        let mut file = fs::File::create(&secret_file).await?;

        file.write_all(&random_bytes).await?;
        info!("Generated new token secret");
        random_bytes.to_vec()
    };
    Ok(secret)
}
