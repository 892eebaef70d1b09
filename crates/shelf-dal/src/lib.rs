pub mod author;
pub mod error;
pub mod filter;
pub mod user;
pub mod validation;

mod query;

use std::{fmt::Display, str::FromStr};

pub use error::Error;
pub use filter::{Filter, Predicate};
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Asc(String),
    Desc(String),
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc(s) => write!(f, "{}", s),
            Order::Desc(s) => write!(f, "{} DESC", s),
        }
    }
}

impl AsRef<str> for Order {
    fn as_ref(&self) -> &str {
        match self {
            Order::Asc(s) => s.as_str(),
            Order::Desc(s) => s.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Option<Vec<Order>>,
    pub filters: Vec<Filter>,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: None,
            filters: Vec::new(),
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }

    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// ORDER BY clause body, `id` is appended as tie breaker so paging is stable
    pub fn ordering(&self, valid_fields: &[&str]) -> Result<String> {
        let mut orderings = self
            .order
            .as_ref()
            .map(|o| {
                o.iter()
                    .map(|o| {
                        if valid_fields.contains(&o.as_ref()) {
                            Ok(o.to_string())
                        } else {
                            Err(Error::InvalidOrderByField(o.as_ref().to_string()))
                        }
                    })
                    .collect::<Result<Vec<String>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let has_id = self
            .order
            .iter()
            .flatten()
            .any(|o| o.as_ref() == "id");
        if !has_id {
            orderings.push("id".to_string());
        }
        Ok(orderings.join(", "))
    }

    pub fn check_filters(&self, valid_fields: &[&str]) -> Result<()> {
        match self
            .filters
            .iter()
            .find(|f| !valid_fields.contains(&f.field.as_str()))
        {
            Some(f) => Err(Error::InvalidFilterField(f.field.clone())),
            None => Ok(()),
        }
    }
}

/// One page of records together with total number of matching records
#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub offset: i64,
    pub limit: i64,
    pub total: u64,
    pub rows: Vec<T>,
}

impl<T> Batch<T> {
    pub fn map<U, F>(self, f: F) -> Batch<U>
    where
        F: FnMut(T) -> U,
    {
        Batch {
            offset: self.offset,
            limit: self.limit,
            total: self.total,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }
}
