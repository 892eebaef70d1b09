pub mod author;
pub mod descriptor;
pub mod macros;
pub mod paging;
pub mod query;
pub mod response;
pub mod user;

use crate::state::AppState;

/// Routes under `/api`
pub fn api_router() -> axum::Router<AppState> {
    axum::Router::new()
        .nest("/authors", author::router())
        .nest("/users", user::router())
        .nest("/access_tokens", crate::auth::auth_router())
}
