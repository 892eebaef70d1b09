use std::marker::PhantomData;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use garde::Validate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

fn invalid_body(reason: impl std::fmt::Display) -> ApiError {
    debug!("Invalid request body: {reason}");
    ApiError::InvalidRequest(format!("data={reason}"))
}

/// Request body in `{"data": {...}}` envelope.
///
/// Extraction only buffers the body. Parsing and entity rules are both deferred
/// to [`Payload::validate`], so the handler can authorize the actor first.
pub struct Payload<T> {
    body: Bytes,
    entity: PhantomData<fn() -> T>,
}

impl<T> Payload<T>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    pub fn new(body: impl Into<Bytes>) -> Self {
        Payload {
            body: body.into(),
            entity: PhantomData,
        }
    }

    /// Consumes the payload and returns the data within if it parses and all rules pass,
    /// otherwise all failing attributes are reported together.
    pub fn validate(self) -> ApiResult<T> {
        let Envelope { data } =
            serde_json::from_slice::<Envelope<T>>(&self.body).map_err(invalid_body)?;
        data.validate()?;
        Ok(data)
    }
}

impl<T> FromRequest<AppState> for Payload<T>
where
    T: DeserializeOwned + Validate<Context = ()>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(Payload::new(body))
    }
}
