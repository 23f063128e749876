use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::automation_log::AutomationLog;
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::assistant::ChatReply;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize, ts_rs::TS)]
pub struct ChatRequest {
    pub message: String,
    /// Project context for actions the assistant decides to take.
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ts_rs::TS)]
pub struct ReportResponse {
    pub report: String,
}

pub async fn chat(
    State(deployment): State<Deployment>,
    Json(payload): Json<ChatRequest>,
) -> Result<ResponseJson<ApiResponse<ChatReply>>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }
    let reply = deployment
        .assistant()
        .chat(
            &deployment.db().pool,
            &payload.message,
            payload.project_id,
        )
        .await?;
    Ok(ResponseJson(ApiResponse::success(reply)))
}

pub async fn director_report(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<ReportResponse>>, ApiError> {
    let report = deployment
        .assistant()
        .director_report(&deployment.db().pool)
        .await?;
    Ok(ResponseJson(ApiResponse::success(ReportResponse { report })))
}

pub async fn project_risks(
    State(deployment): State<Deployment>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ReportResponse>>, ApiError> {
    let report = deployment
        .assistant()
        .project_risks(&deployment.db().pool, project_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(ReportResponse { report })))
}

pub async fn optimize_schedule(
    State(deployment): State<Deployment>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ReportResponse>>, ApiError> {
    let report = deployment
        .assistant()
        .optimize_schedule(&deployment.db().pool, project_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(ReportResponse { report })))
}

pub async fn team_efficiency(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<ReportResponse>>, ApiError> {
    let report = deployment
        .assistant()
        .team_efficiency(&deployment.db().pool)
        .await?;
    Ok(ResponseJson(ApiResponse::success(ReportResponse { report })))
}

pub async fn compliance_check(
    State(deployment): State<Deployment>,
    Path(file_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ReportResponse>>, ApiError> {
    let report = deployment
        .assistant()
        .compliance_check(&deployment.db().pool, file_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(ReportResponse { report })))
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<u64>,
}

pub async fn automation_logs(
    State(deployment): State<Deployment>,
    Query(query): Query<LogQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<AutomationLog>>>, ApiError> {
    let logs =
        AutomationLog::find_recent(&deployment.db().pool, query.limit.unwrap_or(50)).await?;
    Ok(ResponseJson(ApiResponse::success(logs)))
}

pub fn router() -> Router<Deployment> {
    let assistant_router = Router::new()
        .route("/chat", post(chat))
        .route("/reports/director", post(director_report))
        .route("/projects/{project_id}/risks", post(project_risks))
        .route("/projects/{project_id}/schedule", post(optimize_schedule))
        .route("/team-efficiency", post(team_efficiency))
        .route("/files/{file_id}/compliance", post(compliance_check));

    Router::new()
        .nest("/assistant", assistant_router)
        .route("/automation/logs", get(automation_logs))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::*;
    use crate::test_support::TestEnvGuard;

    // Without an API key the assistant endpoints must fail fast rather than
    // hang on an outbound request.
    #[tokio::test]
    async fn unconfigured_assistant_returns_service_unavailable() {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let _env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();

        let err = director_report(State(deployment))
            .await
            .unwrap_err();

        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
