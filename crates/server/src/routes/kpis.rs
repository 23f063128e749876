use axum::{Extension, Json, extract::State, response::Json as ResponseJson};
use db::models::{
    kpi::{Kpi, UpsertKpi},
    project::Project,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::error::ApiError;

/// Mounted under `/projects/{id}/kpis`.
pub async fn get_project_kpis(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Kpi>>>, ApiError> {
    let kpis = Kpi::find_by_project(&deployment.db().pool, project.id).await?;
    Ok(ResponseJson(ApiResponse::success(kpis)))
}

pub async fn upsert_project_kpi(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
    Json(payload): Json<UpsertKpi>,
) -> Result<ResponseJson<ApiResponse<Kpi>>, ApiError> {
    let kpi = Kpi::upsert(&deployment.db().pool, project.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(kpi)))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use db::models::project::CreateProject;
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    #[tokio::test]
    async fn same_metric_and_date_overwrites_instead_of_duplicating() {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let _env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();
        let project = Project::create(
            &deployment.db().pool,
            &CreateProject {
                name: "Harbor Point".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let payload = UpsertKpi {
            kpi_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            metric_type: "model_maturity".to_string(),
            metric_value: 55.0,
            target_value: Some(80.0),
            unit: Some("percent".to_string()),
            notes: None,
        };
        upsert_project_kpi(
            Extension(project.clone()),
            State(deployment.clone()),
            Json(payload.clone()),
        )
        .await
        .unwrap();

        let second = UpsertKpi {
            metric_value: 62.0,
            ..payload
        };
        upsert_project_kpi(
            Extension(project.clone()),
            State(deployment.clone()),
            Json(second),
        )
        .await
        .unwrap();

        let kpis = get_project_kpis(Extension(project), State(deployment))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert_eq!(kpis.len(), 1);
        assert_eq!(kpis[0].metric_value, 62.0);
    }
}
