use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{
    bim_file::BimFileError, clash::ClashError, kpi::KpiError, project::ProjectError,
    task::TaskError, team::TeamError, user::UserError,
};
use deployment::DeploymentError;
use sea_orm::DbErr;
use services::services::{
    assistant::AssistantError, auth::AuthError, config::ConfigError, importer::ImportError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error, ts_rs::TS)]
#[ts(type = "string")]
pub enum ApiError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Team(#[from] TeamError),
    #[error(transparent)]
    BimFile(#[from] BimFileError),
    #[error(transparent)]
    Clash(#[from] ClashError),
    #[error(transparent)]
    Kpi(#[from] KpiError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<&'static str> for ApiError {
    fn from(msg: &'static str) -> Self {
        ApiError::BadRequest(msg.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Project(err) => match err {
                ProjectError::ProjectNotFound => (StatusCode::NOT_FOUND, "ProjectError"),
                ProjectError::DuplicateCode(_) => (StatusCode::CONFLICT, "ProjectError"),
                ProjectError::EmptyName => (StatusCode::BAD_REQUEST, "ProjectError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ProjectError"),
            },
            ApiError::Task(err) => match err {
                TaskError::TaskNotFound | TaskError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "TaskError")
                }
                TaskError::EmptyName => (StatusCode::BAD_REQUEST, "TaskError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TaskError"),
            },
            ApiError::Team(err) => match err {
                TeamError::MemberNotFound | TeamError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "TeamError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "TeamError"),
            },
            ApiError::BimFile(err) => match err {
                BimFileError::FileNotFound | BimFileError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "BimFileError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "BimFileError"),
            },
            ApiError::Clash(err) => match err {
                ClashError::ClashNotFound | ClashError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "ClashError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ClashError"),
            },
            ApiError::Kpi(err) => match err {
                KpiError::ProjectNotFound => (StatusCode::NOT_FOUND, "KpiError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "KpiError"),
            },
            ApiError::User(err) => match err {
                UserError::UserNotFound => (StatusCode::NOT_FOUND, "UserError"),
                UserError::EmailTaken(_) => (StatusCode::CONFLICT, "UserError"),
                UserError::CompanyNotFound => (StatusCode::BAD_REQUEST, "UserError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "UserError"),
            },
            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "AuthError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "AuthError"),
            },
            ApiError::Import(err) => match err {
                ImportError::MissingSheet(_) => (StatusCode::BAD_REQUEST, "ImportError"),
                ImportError::Workbook(_) => (StatusCode::BAD_REQUEST, "ImportError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ImportError"),
            },
            ApiError::Assistant(err) => match err {
                AssistantError::Unconfigured => (StatusCode::SERVICE_UNAVAILABLE, "AssistantError"),
                AssistantError::ProjectNotFound | AssistantError::FileNotFound => {
                    (StatusCode::NOT_FOUND, "AssistantError")
                }
                AssistantError::Http(_) => (StatusCode::BAD_GATEWAY, "AssistantError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "AssistantError"),
            },
            ApiError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ConfigError"),
            ApiError::Deployment(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DeploymentError"),
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IoError"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "ForbiddenError"),
        };

        let error_message = match &self {
            ApiError::Unauthorized => "Unauthorized. Please sign in again.".to_string(),
            ApiError::Auth(AuthError::InvalidCredentials) => {
                "Invalid email or password.".to_string()
            }
            ApiError::Assistant(AssistantError::Unconfigured) => {
                "AI assistant is not configured. Set an API key to enable it.".to_string()
            }
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Internal(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::Forbidden(msg) => msg.clone(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_errors_map_to_404() {
        assert_eq!(
            status_of(ApiError::Project(ProjectError::ProjectNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Task(TaskError::TaskNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::NotFound("gone".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn credential_and_permission_statuses() {
        assert_eq!(
            status_of(ApiError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::Forbidden("no".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn duplicate_code_is_conflict() {
        assert_eq!(
            status_of(ApiError::Project(ProjectError::DuplicateCode("X".into()))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unconfigured_assistant_is_service_unavailable() {
        assert_eq!(
            status_of(ApiError::Assistant(AssistantError::Unconfigured)),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn database_errors_default_to_500() {
        assert_eq!(
            status_of(ApiError::Database(DbErr::Custom("boom".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
