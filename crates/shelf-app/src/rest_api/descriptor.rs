use serde_json::Value;
use shelf_dal::Predicate;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::policy::ResourceKind;

pub type FieldAccessor<T> = fn(&T) -> Value;

/// Static metadata of one REST resource
///
/// All lists are ordered, `fields` order is the order of keys in responses.
pub struct ResourceDescriptor<T: 'static> {
    /// Path segment under `/api`
    pub name: &'static str,
    pub kind: ResourceKind,
    pub id: fn(&T) -> i64,
    pub fields: &'static [(&'static str, FieldAccessor<T>)],
    pub sortable: &'static [&'static str],
    /// Accepted filters, query key is `<field>_<predicate>`
    pub filters: &'static [(&'static str, Predicate)],
}

impl<T: 'static> ResourceDescriptor<T> {
    /// Returns the field name as held by the descriptor
    pub fn field(&self, name: &str) -> Option<&'static str> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(n, _)| *n)
    }

    pub fn sort_column(&self, name: &str) -> Option<&'static str> {
        self.sortable.iter().find(|c| **c == name).copied()
    }

    pub fn filter(&self, key: &str) -> Option<(&'static str, Predicate)> {
        self.filters
            .iter()
            .find(|(field, predicate)| {
                key.strip_prefix(*field)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .is_some_and(|p| p == predicate.as_str())
            })
            .copied()
    }

    pub fn path(&self) -> String {
        format!("/api/{}", self.name)
    }

    pub fn record_path(&self, record: &T) -> String {
        format!("/api/{}/{}", self.name, (self.id)(record))
    }
}

pub fn timestamp(value: &OffsetDateTime) -> Value {
    value
        .format(&Rfc3339)
        .map(Value::String)
        .unwrap_or(Value::Null)
}

pub fn optional_timestamp(value: &Option<OffsetDateTime>) -> Value {
    value.as_ref().map(timestamp).unwrap_or(Value::Null)
}

/// Builds the field accessor table of a descriptor.
///
/// Fields are serialized with `serde_json`, unless converter function is given after `=>`.
#[macro_export]
macro_rules! presenter_fields {
    (@accessor $entity:ty, $field:ident) => {
        (|record: &$entity| serde_json::json!(record.$field))
            as $crate::rest_api::descriptor::FieldAccessor<$entity>
    };
    (@accessor $entity:ty, $field:ident, $conv:path) => {
        (|record: &$entity| $conv(&record.$field))
            as $crate::rest_api::descriptor::FieldAccessor<$entity>
    };
    ($entity:ty; $($field:ident $(=> $conv:path)?),+ $(,)?) => {
        &[$((
            stringify!($field),
            $crate::presenter_fields!(@accessor $entity, $field $(, $conv)?),
        )),+]
    };
}
