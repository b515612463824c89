//! Schema check for user payloads.
//!
//! Every field is checked independently and at most one error is reported per
//! field, so a payload with three bad fields yields three errors in
//! `email`, `givenName`, `familyName` order.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use super::dto::NewUser;
use crate::error::ApiError;

lazy_static! {
    // Domain is two or more dot-separated labels; a label is alphanumeric
    // with hyphens allowed only inside it.
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[^@\s]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    NotString,
    Empty,
    InvalidEmail,
    NotObject,
}

impl FieldErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            FieldErrorKind::Required => "is required",
            FieldErrorKind::NotString => "must be a string",
            FieldErrorKind::Empty => "is not allowed to be empty",
            FieldErrorKind::InvalidEmail => "must be a valid email",
            FieldErrorKind::NotObject => "must be of type object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    fn new(field: &'static str, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}", self.field, self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error: {}", joined(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn joined(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, FieldError> {
    match obj.get(field) {
        None => Err(FieldError::new(field, FieldErrorKind::Required)),
        Some(Value::String(s)) if s.is_empty() => Err(FieldError::new(field, FieldErrorKind::Empty)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(FieldError::new(field, FieldErrorKind::NotString)),
    }
}

fn email(obj: &Map<String, Value>) -> Result<&str, FieldError> {
    let value = required_string(obj, "email")?;
    if EMAIL_RE.is_match(value) {
        Ok(value)
    } else {
        Err(FieldError::new("email", FieldErrorKind::InvalidEmail))
    }
}

pub fn validate(payload: &Value) -> Result<NewUser, ValidationErrors> {
    let Some(obj) = payload.as_object() else {
        return Err(ValidationErrors(vec![FieldError::new(
            "value",
            FieldErrorKind::NotObject,
        )]));
    };

    match (
        email(obj),
        required_string(obj, "givenName"),
        required_string(obj, "familyName"),
    ) {
        (Ok(email), Ok(given_name), Ok(family_name)) => Ok(NewUser {
            email: email.to_string(),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
        }),
        (email, given_name, family_name) => Err(ValidationErrors(
            [email.err(), given_name.err(), family_name.err()]
                .into_iter()
                .flatten()
                .collect(),
        )),
    }
}
