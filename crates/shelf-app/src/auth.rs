pub mod token;

use axum::routing::post;

use crate::state::AppState;

pub fn auth_router() -> axum::Router<AppState> {
    axum::Router::new().route("/", post(token::create_token))
}
