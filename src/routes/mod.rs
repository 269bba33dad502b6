/// Router Module Index
///
/// Routes are split by access level, and access control is applied per module with
/// Axum layers in `create_router`, so an endpoint cannot be exposed by accident.

/// Routes open to anonymous clients.
pub mod public;

/// Routes behind the bearer-token gate (`require_auth`).
pub mod authenticated;

/// Routes behind the bearer-token gate plus `require_role(Role::Admin)`.
pub mod admin;
