use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::{
    header::{LINK, LOCATION},
    HeaderValue, StatusCode,
};
use serde::{ser::SerializeMap, Serialize, Serializer};

use super::{descriptor::ResourceDescriptor, query::QuerySpec};
use crate::error::{ApiError, ApiResult};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Record restricted to selected fields, keys are emitted in declared order
pub struct Projection<'a, T: 'static> {
    record: &'a T,
    descriptor: &'static ResourceDescriptor<T>,
    spec: Option<&'a QuerySpec>,
}

impl<'a, T: 'static> Projection<'a, T> {
    pub fn full(record: &'a T, descriptor: &'static ResourceDescriptor<T>) -> Self {
        Self {
            record,
            descriptor,
            spec: None,
        }
    }

    pub fn selected(
        record: &'a T,
        descriptor: &'static ResourceDescriptor<T>,
        spec: &'a QuerySpec,
    ) -> Self {
        Self {
            record,
            descriptor,
            spec: Some(spec),
        }
    }
}

impl<T: 'static> Serialize for Projection<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let selected = self
            .descriptor
            .fields
            .iter()
            .filter(|(name, _)| self.spec.is_none_or(|spec| spec.is_selected(name)));
        let mut map = serializer.serialize_map(None)?;
        for (name, accessor) in selected {
            map.serialize_entry(name, &accessor(self.record))?;
        }
        map.end()
    }
}

fn header_value(value: &str) -> ApiResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ApiError::InternalError(format!("Invalid header value {value}: {e}")))
}

pub fn list<T: 'static>(
    descriptor: &'static ResourceDescriptor<T>,
    spec: &QuerySpec,
    rows: &[T],
    link: Option<String>,
) -> ApiResult<Response> {
    let data: Vec<_> = rows
        .iter()
        .map(|record| Projection::selected(record, descriptor, spec))
        .collect();
    let mut response = (StatusCode::OK, Json(Data { data })).into_response();
    if let Some(link) = link {
        response.headers_mut().insert(LINK, header_value(&link)?);
    }
    Ok(response)
}

pub fn show<T: 'static>(descriptor: &'static ResourceDescriptor<T>, record: &T) -> Response {
    (
        StatusCode::OK,
        Json(Data {
            data: Projection::full(record, descriptor),
        }),
    )
        .into_response()
}

/// 201 with `Location` of the new record
pub fn created<T: 'static>(
    descriptor: &'static ResourceDescriptor<T>,
    record: &T,
    location: &str,
) -> ApiResult<Response> {
    let mut response = (
        StatusCode::CREATED,
        Json(Data {
            data: Projection::full(record, descriptor),
        }),
    )
        .into_response();
    response
        .headers_mut()
        .insert(LOCATION, header_value(location)?);
    Ok(response)
}

pub fn deleted() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
