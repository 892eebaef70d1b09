use axum::{extract::State, response::IntoResponse, Json, RequestPartsExt};
use axum_extra::TypedHeader;
use garde::Validate;
use headers::{authorization::Bearer, Authorization};
use http::{header::AUTHORIZATION, request::Parts, StatusCode};
use serde::{Deserialize, Serialize};
use shelf_dal::{user::UserRepository, validation::not_blank};
use shelf_types::claim::ApiClaim;
use tracing::{debug, info};

use crate::{
    error::{ApiError, ApiResult},
    policy::{self, Action, ActorRole, ResourceKind},
    rest_api::response::Data,
    state::AppState,
    validate::Payload,
};

/// Who is making the request, as established by the bearer token
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    Authenticated(ApiClaim),
}

impl Actor {
    pub fn role(&self) -> ActorRole {
        match self {
            Actor::Anonymous => ActorRole::Anonymous,
            Actor::Authenticated(claim) => claim.role.into(),
        }
    }
}

impl axum::extract::FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Actor::Anonymous);
        }

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!("Invalid authorization header: {e}");
                ApiError::Unauthorized("Invalid authorization header".to_string())
            })?;

        let claim = state
            .tokens()
            .validate::<ApiClaim>(bearer.token())
            .map_err(|e| {
                debug!("Failed to validate token: {e}");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })?;
        Ok(Actor::Authenticated(claim))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub email: String,
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub token: String,
    pub user_id: i64,
    /// Seconds
    pub expires_in: u64,
}

pub async fn create_token(
    State(state): State<AppState>,
    actor: Actor,
    repository: UserRepository,
    payload: Payload<Credentials>,
) -> ApiResult<impl IntoResponse> {
    policy::require(ResourceKind::AccessToken, Action::Create, &actor)?;
    let credentials = payload.validate()?;

    let user = repository
        .check_password(&credentials.email, &credentials.password)
        .await?;

    let claim = ApiClaim::new(user.id.to_string(), user.role);
    let token = state.tokens().issue(claim)?;
    info!("Issued access token for user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(Data {
            data: AccessToken {
                token,
                user_id: user.id,
                expires_in: state.tokens().default_validity().as_secs(),
            },
        }),
    ))
}
