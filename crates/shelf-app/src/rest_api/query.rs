use shelf_dal::{Filter, ListingParams, Order};
use url::form_urlencoded;

use super::{descriptor::ResourceDescriptor, paging::PageLimits};
use crate::error::{ApiError, ApiResult};

/// Validated parameters of one list request
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Selected fields, empty means all
    pub fields: Vec<&'static str>,
    pub sort: &'static str,
    pub descending: bool,
    pub page: u32,
    pub per: u32,
    pub filters: Vec<Filter>,
}

impl QuerySpec {
    pub fn is_selected(&self, field: &str) -> bool {
        self.fields.is_empty() || self.fields.iter().any(|f| *f == field)
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per as i64
    }

    pub fn to_listing_params(&self) -> ListingParams {
        let order = if self.descending {
            Order::Desc(self.sort.to_string())
        } else {
            Order::Asc(self.sort.to_string())
        };
        ListingParams {
            offset: self.offset(),
            limit: self.per as i64,
            order: Some(vec![order]),
            filters: self.filters.clone(),
        }
    }
}

type Pairs = [(String, String)];

fn invalid(key: &str, value: &str) -> ApiError {
    ApiError::InvalidQuery(format!("{key}={value}"))
}

/// Last non empty value of parameter
fn last_value<'a>(pairs: &'a Pairs, name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, v)| k == name && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

fn parse_fields<T: 'static>(
    pairs: &Pairs,
    descriptor: &ResourceDescriptor<T>,
) -> ApiResult<Vec<&'static str>> {
    let Some(value) = last_value(pairs, "fields") else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| descriptor.field(name).ok_or_else(|| invalid("fields", name)))
        .collect()
}

fn parse_sort<T: 'static>(
    pairs: &Pairs,
    descriptor: &ResourceDescriptor<T>,
) -> ApiResult<(&'static str, bool)> {
    let column = match last_value(pairs, "sort") {
        Some(value) => descriptor
            .sort_column(value)
            .ok_or_else(|| invalid("sort", value))?,
        None => "id",
    };
    let descending = last_value(pairs, "dir").is_some_and(|d| d.eq_ignore_ascii_case("desc"));
    Ok((column, descending))
}

fn parse_positive(pairs: &Pairs, name: &str) -> ApiResult<Option<u32>> {
    let Some(value) = last_value(pairs, name) else {
        return Ok(None);
    };
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(name, value));
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(invalid(name, value)),
    }
}

fn parse_filters<T: 'static>(
    pairs: &Pairs,
    descriptor: &ResourceDescriptor<T>,
) -> ApiResult<Vec<Filter>> {
    let mut filters = Vec::new();
    for (key, value) in pairs {
        if key == "q" {
            return Err(invalid(key, value));
        }
        if !key.starts_with("q[") {
            continue;
        }
        let (field, predicate) = key
            .strip_prefix("q[")
            .and_then(|k| k.strip_suffix(']'))
            .and_then(|k| descriptor.filter(k))
            .ok_or_else(|| invalid(key, value))?;
        // blank filter values are ignored
        if !value.is_empty() {
            filters.push(Filter::new(field, predicate, value.as_str()));
        }
    }
    Ok(filters)
}

/// Validates raw query string of list request against resource descriptor.
///
/// Only the first invalid parameter is reported, categories are checked in order
/// `fields`, `sort`, `page`, `per`, `q[...]`. Unknown parameters are ignored.
pub fn parse_query<T: 'static>(
    query: &str,
    descriptor: &ResourceDescriptor<T>,
    limits: PageLimits,
) -> ApiResult<QuerySpec> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    let fields = parse_fields(&pairs, descriptor)?;
    let (sort, descending) = parse_sort(&pairs, descriptor)?;
    let page = parse_positive(&pairs, "page")?.unwrap_or(1);
    let per = parse_positive(&pairs, "per")?
        .map(|per| per.min(limits.max_size))
        .unwrap_or(limits.default_size);
    let filters = parse_filters(&pairs, descriptor)?;

    Ok(QuerySpec {
        fields,
        sort,
        descending,
        page,
        per,
        filters,
    })
}
