use std::path::PathBuf;

use axum::{
    Extension, Json, Router, extract::State, response::Json as ResponseJson, routing::post,
};
use db::models::user::User;
use deployment::Deployment;
use serde::Deserialize;
use services::services::importer::{self, ImportSummary};
use utils::response::ApiResponse;

use crate::{error::ApiError, routes::require_manage};

#[derive(Debug, Default, Deserialize, ts_rs::TS)]
pub struct ImportRequest {
    /// Workbook to read. Defaults to the company workbook in the asset
    /// directory when omitted.
    pub path: Option<PathBuf>,
}

pub async fn import_projects(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    payload: Option<Json<ImportRequest>>,
) -> Result<ResponseJson<ApiResponse<ImportSummary>>, ApiError> {
    require_manage(&user)?;

    let path = payload
        .and_then(|Json(req)| req.path)
        .unwrap_or_else(utils::assets::workbook_path);
    if !path.exists() {
        return Err(ApiError::BadRequest(format!(
            "Workbook not found at {}",
            path.display()
        )));
    }

    tracing::info!(path = %path.display(), "Importing projects from workbook");
    let summary = importer::import_workbook(&deployment.db().pool, &path).await?;
    tracing::info!(
        created = summary.projects_created,
        skipped = summary.projects_skipped,
        members = summary.team_members_created,
        tasks = summary.tasks_created,
        users = summary.users_created,
        "Workbook import finished"
    );
    Ok(ResponseJson(ApiResponse::success(summary)))
}

pub fn router() -> Router<Deployment> {
    Router::new().route("/import/projects", post(import_projects))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    #[tokio::test]
    async fn missing_workbook_is_a_bad_request() {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let _env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();
        let director = User::find_all(&deployment.db().pool)
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap();

        let err = import_projects(
            Extension(director),
            State(deployment),
            Some(Json(ImportRequest {
                path: Some(temp_root.join("nope.xlsx")),
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
