use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{activity::ActivityEntry, stats::DashboardStats};
use deployment::Deployment;
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::error::ApiError;

const DEFAULT_ACTIVITY_LIMIT: u64 = 20;

pub async fn get_stats(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<DashboardStats>>, ApiError> {
    let stats = DashboardStats::compute(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(stats)))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u64>,
}

pub async fn get_activity(
    State(deployment): State<Deployment>,
    Query(query): Query<ActivityQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ActivityEntry>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    let entries = ActivityEntry::recent(&deployment.db().pool, limit).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/activity", get(get_activity))
}

#[cfg(test)]
mod tests {
    use db::models::project::{CreateProject, Project};
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    #[tokio::test]
    async fn stats_reflect_seeded_projects() {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let _env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();
        Project::create(
            &deployment.db().pool,
            &CreateProject {
                name: "Harbor Point".to_string(),
                progress: Some(40),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stats = get_stats(State(deployment.clone()))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert_eq!(stats.total_projects, 1);
        assert_eq!(stats.average_project_progress, 40.0);

        let activity = get_activity(State(deployment), Query(ActivityQuery { limit: None }))
            .await
            .unwrap()
            .0
            .data
            .unwrap();
        assert_eq!(activity.len(), 1);
    }
}
