//! Custom garde rules producing the messages returned by the API.

use shelf_types::{claim::Role, general::ValidEmail};

pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const TAKEN: &str = "has already been taken";
pub const NOT_INCLUDED: &str = "is not included in the list";
pub const MIN_PASSWORD_LENGTH: usize = 8;

fn too_short() -> garde::Error {
    garde::Error::new(format!(
        "is too short (minimum is {MIN_PASSWORD_LENGTH} characters)"
    ))
}

pub fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        Err(garde::Error::new(BLANK))
    } else {
        Ok(())
    }
}

pub fn email_format(value: &str, _ctx: &()) -> garde::Result {
    if ValidEmail::is_valid(value) {
        Ok(())
    } else {
        Err(garde::Error::new(INVALID))
    }
}

pub fn password_length(value: &str, _ctx: &()) -> garde::Result {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        Err(too_short())
    } else {
        Ok(())
    }
}

// Variants for partial updates, absent value means no change

pub fn not_blank_if_present(value: &Option<String>, ctx: &()) -> garde::Result {
    value.as_deref().map_or(Ok(()), |v| not_blank(v, ctx))
}

pub fn email_format_if_present(value: &Option<String>, ctx: &()) -> garde::Result {
    value.as_deref().map_or(Ok(()), |v| email_format(v, ctx))
}

pub fn password_length_if_present(value: &Option<String>, ctx: &()) -> garde::Result {
    value.as_deref().map_or(Ok(()), |v| password_length(v, ctx))
}

pub fn role_if_present(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value.as_deref() {
        Some(role) if role.parse::<Role>().is_err() => Err(garde::Error::new(NOT_INCLUDED)),
        _ => Ok(()),
    }
}
