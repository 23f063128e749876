use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    project::{CreateProject, Project, UpdateProject},
    user::User,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{
    error::ApiError,
    middleware::load_project_middleware,
    routes::{clashes, files, kpis, require_manage, team},
};

pub async fn get_projects(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_project(
    Extension(project): Extension<Project>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn create_project(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    require_manage(&user)?;
    tracing::debug!("Creating project '{}'", payload.name);

    let project = Project::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    Extension(user): Extension<User>,
    Extension(existing): Extension<Project>,
    State(deployment): State<Deployment>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    require_manage(&user)?;
    let project = Project::update(&deployment.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    Extension(user): Extension<User>,
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_manage(&user)?;
    Project::delete(&deployment.db().pool, project.id).await?;
    tracing::info!(project = %project.project_code, "Project deleted");
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let project_id_router = Router::new()
        .route(
            "/",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/team", get(team::get_project_team))
        .route(
            "/files",
            get(files::get_project_files).post(files::register_project_file),
        )
        .route(
            "/clashes",
            get(clashes::get_project_clashes).post(clashes::create_project_clash),
        )
        .route(
            "/kpis",
            get(kpis::get_project_kpis).post(kpis::upsert_project_kpi),
        )
        .layer(from_fn_with_state(
            deployment.clone(),
            load_project_middleware,
        ));

    let projects_router = Router::new()
        .route("/", get(get_projects).post(create_project))
        .nest("/{id}", project_id_router);

    Router::new().nest("/projects", projects_router)
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use db::models::project::derive_project_code;
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    async fn setup() -> (TestEnvGuard, Deployment, User) {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();
        let director = User::find_all(&deployment.db().pool)
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        (env_guard, deployment, director)
    }

    #[tokio::test]
    async fn create_project_derives_code_from_name() {
        let (_env_guard, deployment, director) = setup().await;

        let payload = CreateProject {
            name: "Marina Bay Towers".to_string(),
            ..Default::default()
        };
        let response = create_project(
            Extension(director),
            State(deployment),
            Json(payload),
        )
        .await
        .unwrap();

        let project = response.0.data.unwrap();
        assert_eq!(project.project_code, derive_project_code("Marina Bay Towers", 1));
        assert_eq!(project.project_number, 1);
    }

    #[tokio::test]
    async fn duplicate_project_code_returns_conflict() {
        let (_env_guard, deployment, director) = setup().await;

        let payload = CreateProject {
            name: "Marina Bay Towers".to_string(),
            project_code: Some("MBT-001".to_string()),
            ..Default::default()
        };
        create_project(
            Extension(director.clone()),
            State(deployment.clone()),
            Json(payload.clone()),
        )
        .await
        .unwrap();

        let err = create_project(Extension(director), State(deployment), Json(payload))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
    }
}
