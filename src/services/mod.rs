//! Business operations behind the HTTP handlers.
//!
//! Services take the repository (and media store where needed) as trait objects, apply
//! validation and authorization rules, and return `ApiError` on failure. Handlers only
//! extract inputs and shape responses.

pub mod accounts;
pub mod assignments;
pub mod courses;
pub mod groups;
pub mod media;
pub mod policy;

use crate::error::ApiError;

/// Returns the trimmed value, or `BadRequest(message)` when missing or blank.
pub(crate) fn required_text(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}
