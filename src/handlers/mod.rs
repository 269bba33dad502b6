//! HTTP handlers.
//!
//! Handlers are thin: they pull the caller identity, path params and JSON bodies out of
//! the request, call into `services`, and wrap the result in the response envelope the
//! route expects. All failures are `ApiError`.

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod groups;
pub mod media;
pub mod users;
