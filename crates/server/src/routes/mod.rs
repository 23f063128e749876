use db::models::user::User;

use crate::error::ApiError;

pub mod assistant;
pub mod auth;
pub mod clashes;
pub mod files;
pub mod health;
pub mod import;
pub mod kpis;
pub mod projects;
pub mod stats;
pub mod tasks;
pub mod team;

/// Mutating endpoints are restricted to management roles.
pub(crate) fn require_manage(user: &User) -> Result<(), ApiError> {
    if user.role.can_manage() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Your role does not permit this action".to_string(),
        ))
    }
}
