use argon2::{
    password_hash::{rand_core::OsRng, Result as HashResult, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use garde::Validate;
use serde::{Deserialize, Serialize};
use shelf_types::claim::Role;
use sqlx::Pool;
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    error::{Error, Result},
    query::{list_batch, ListingSource},
    validation::{
        email_format, email_format_if_present, not_blank, not_blank_if_present, password_length,
        password_length_if_present, role_if_present,
    },
    Batch, ListingParams,
};

const COLUMNS: &str =
    "id, email, given_name, family_name, role, last_logged_in_at, created_at, updated_at";
pub const VALID_ORDER_FIELDS: &[&str] = &[
    "id",
    "email",
    "given_name",
    "family_name",
    "role",
    "last_logged_in_at",
    "created_at",
    "updated_at",
];
pub const VALID_FILTER_FIELDS: &[&str] = &[
    "id",
    "email",
    "given_name",
    "family_name",
    "role",
    "created_at",
    "updated_at",
];

fn hash_password(password: &str) -> HashResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(password_hash)
}

fn verify_password(password: &str, password_hash: &str) -> HashResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let res = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    if let Err(e) = res {
        debug!("Invalid password, error {e}");
    }
    Ok(res.is_ok())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn map_unique_violation(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::Conflict { field: "email" }
        }
        e => e.into(),
    }
}

/// Open registration payload, role is always [`Role::User`]
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateUser {
    #[serde(default)]
    #[garde(custom(not_blank), custom(email_format))]
    pub email: String,
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub given_name: String,
    #[serde(default)]
    #[garde(custom(not_blank))]
    pub family_name: String,
    #[serde(default)]
    #[garde(custom(not_blank), custom(password_length))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
pub struct UpdateUser {
    #[garde(custom(not_blank_if_present), custom(email_format_if_present))]
    pub email: Option<String>,
    #[garde(custom(not_blank_if_present))]
    pub given_name: Option<String>,
    #[garde(custom(not_blank_if_present))]
    pub family_name: Option<String>,
    #[garde(custom(not_blank_if_present), custom(password_length_if_present))]
    pub password: Option<String>,
    #[garde(custom(role_if_present))]
    pub role: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserInt {
    id: i64,
    email: String,
    given_name: String,
    family_name: String,
    role: String,
    last_logged_in_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role: Role,
    pub last_logged_in_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<UserInt> for User {
    fn from(value: UserInt) -> Self {
        Self {
            id: value.id,
            email: value.email,
            given_name: value.given_name,
            family_name: value.family_name,
            role: value.role.parse().unwrap_or_else(|e| {
                tracing::warn!("User {} has invalid role stored: {e}", value.id);
                Role::User
            }),
            last_logged_in_at: value.last_logged_in_at,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

pub type UserRepository = UserRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct UserRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> UserRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateUser) -> Result<User> {
        self.create_with_role(payload, Role::User).await
    }

    pub async fn create_with_role(&self, payload: CreateUser, role: Role) -> Result<User> {
        let password = hash_password(&payload.password)?;
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, UserInt>(&format!(
            "INSERT INTO users (email, given_name, family_name, password_digest, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(normalize_email(&payload.email))
        .bind(payload.given_name.trim())
        .bind(payload.family_name.trim())
        .bind(password)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.executor)
        .await
        .map_err(map_unique_violation)?;

        Ok(user.into())
    }

    pub async fn update(&self, id: i64, payload: UpdateUser) -> Result<User> {
        let password = payload
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;
        let user = sqlx::query_as::<_, UserInt>(&format!(
            "UPDATE users SET email = coalesce(?, email), given_name = coalesce(?, given_name), \
             family_name = coalesce(?, family_name), password_digest = coalesce(?, password_digest), \
             role = coalesce(?, role), updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(payload.email.as_deref().map(normalize_email))
        .bind(payload.given_name.as_deref().map(str::trim))
        .bind(payload.family_name.as_deref().map(str::trim))
        .bind(password)
        .bind(payload.role.as_deref())
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&self.executor)
        .await
        .map_err(map_unique_violation)?;

        user.map(User::from)
            .ok_or_else(|| Error::RecordNotFound(format!("User {id}")))
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
            .fetch_one(&self.executor)
            .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list(&self, params: ListingParams) -> Result<Batch<User>> {
        let batch: Batch<UserInt> = list_batch(
            &self.executor,
            ListingSource {
                table: "users",
                columns: COLUMNS,
                sortable: VALID_ORDER_FIELDS,
                filterable: VALID_FILTER_FIELDS,
            },
            params,
        )
        .await?;
        Ok(batch.map(User::from))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("User {id}")))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, UserInt>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::RecordNotFound(format!("User {id}")))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, UserInt>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
            .bind(normalize_email(email))
            .fetch_optional(&self.executor)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::RecordNotFound(format!("User {email}")))
    }

    /// Verifies credentials and records the login time
    pub async fn check_password(&self, email: &str, password: &str) -> Result<User> {
        let (id, hashed_password): (i64, String) =
            sqlx::query_as("SELECT id, password_digest FROM users WHERE email = ?")
                .bind(normalize_email(email))
                .fetch_one(&self.executor)
                .await
                .map_err(|e| {
                    debug!("User check error: {e}");
                    Error::InvalidCredentials
                })?;
        if verify_password(password, &hashed_password).unwrap_or(false) {
            self.touch_login(id).await
        } else {
            Err(Error::InvalidCredentials)
        }
    }

    pub async fn change_password(&self, email: &str, new_password: &str) -> Result<()> {
        let password = hash_password(new_password)?;
        let res = sqlx::query("UPDATE users SET password_digest = ?, updated_at = ? WHERE email = ?")
            .bind(password)
            .bind(OffsetDateTime::now_utc())
            .bind(normalize_email(email))
            .execute(&self.executor)
            .await?;
        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("User {email}")))
        } else {
            Ok(())
        }
    }

    async fn touch_login(&self, id: i64) -> Result<User> {
        sqlx::query_as::<_, UserInt>(&format!(
            "UPDATE users SET last_logged_in_at = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .map(User::from)
        .ok_or_else(|| Error::RecordNotFound(format!("User {id}")))
    }
}
