use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::OffsetDateTime;

use crate::{
    error::{Error, Result},
    query::{list_batch, ListingSource},
    validation::{not_blank, not_blank_if_present},
    Batch, ListingParams,
};

const COLUMNS: &str = "id, given_name, family_name, created_at, updated_at";
pub const VALID_ORDER_FIELDS: &[&str] =
    &["id", "given_name", "family_name", "created_at", "updated_at"];
pub const VALID_FILTER_FIELDS: &[&str] =
    &["id", "given_name", "family_name", "created_at", "updated_at"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateAuthor {
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub given_name: String,
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub family_name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
pub struct UpdateAuthor {
    #[garde(custom(not_blank_if_present))]
    pub given_name: Option<String>,
    #[garde(custom(not_blank_if_present))]
    pub family_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub given_name: String,
    pub family_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub type AuthorRepository = AuthorRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct AuthorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AuthorRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        let now = OffsetDateTime::now_utc();
        let record = sqlx::query_as::<_, Author>(&format!(
            "INSERT INTO authors (given_name, family_name, created_at, updated_at) \
             VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(payload.given_name.trim())
        .bind(payload.family_name.trim())
        .bind(now)
        .bind(now)
        .fetch_one(&self.executor)
        .await?;
        Ok(record)
    }

    pub async fn update(&self, id: i64, payload: UpdateAuthor) -> Result<Author> {
        let record = sqlx::query_as::<_, Author>(&format!(
            "UPDATE authors SET given_name = coalesce(?, given_name), \
             family_name = coalesce(?, family_name), updated_at = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(payload.given_name.as_deref().map(str::trim))
        .bind(payload.family_name.as_deref().map(str::trim))
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&self.executor)
        .await?;

        record.ok_or_else(|| Error::RecordNotFound(format!("Author {id}")))
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM authors")
            .fetch_one(&self.executor)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Batch<Author>> {
        list_batch(
            &self.executor,
            ListingSource {
                table: "authors",
                columns: COLUMNS,
                sortable: VALID_ORDER_FIELDS,
                filterable: VALID_FILTER_FIELDS,
            },
            params,
        )
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Author {id}")))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Author> {
        sqlx::query_as::<_, Author>(&format!("SELECT {COLUMNS} FROM authors WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(|| Error::RecordNotFound(format!("Author {id}")))
    }
}
