use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    clash::{Clash, CreateClash, UpdateClash},
    project::Project,
    user::User,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{error::ApiError, middleware::load_clash_middleware, routes::require_manage};

/// Listing for a single project, mounted under `/projects/{id}/clashes`.
pub async fn get_project_clashes(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<Clash>>>, ApiError> {
    let clashes = Clash::find_by_project(&deployment.db().pool, project.id).await?;
    Ok(ResponseJson(ApiResponse::success(clashes)))
}

pub async fn create_project_clash(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateClash>,
) -> Result<ResponseJson<ApiResponse<Clash>>, ApiError> {
    let clash = Clash::create(&deployment.db().pool, project.id, &payload).await?;
    tracing::debug!(clash = %clash.clash_code, "Clash recorded");
    Ok(ResponseJson(ApiResponse::success(clash)))
}

pub async fn get_clash(
    Extension(clash): Extension<Clash>,
) -> Result<ResponseJson<ApiResponse<Clash>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(clash)))
}

pub async fn update_clash(
    Extension(existing): Extension<Clash>,
    State(deployment): State<Deployment>,
    Json(payload): Json<UpdateClash>,
) -> Result<ResponseJson<ApiResponse<Clash>>, ApiError> {
    let clash = Clash::update(&deployment.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(clash)))
}

pub async fn delete_clash(
    Extension(user): Extension<User>,
    Extension(clash): Extension<Clash>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_manage(&user)?;
    Clash::delete(&deployment.db().pool, clash.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let clash_id_router = Router::new()
        .route("/", get(get_clash).put(update_clash).delete(delete_clash))
        .layer(from_fn_with_state(deployment.clone(), load_clash_middleware));

    Router::new().nest("/clashes/{clash_id}", clash_id_router)
}

#[cfg(test)]
mod tests {
    use db::{
        models::project::CreateProject,
        types::{ClashStatus, Priority},
    };
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    #[tokio::test]
    async fn resolving_a_clash_stamps_the_resolution_date() {
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
                priority: Some(Priority::High),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let clash = create_project_clash(
            Extension(project),
            State(deployment.clone()),
            Json(CreateClash {
                description: "Duct penetrates structural beam".to_string(),
                discipline_1: Some("MEP".to_string()),
                discipline_2: Some("Structural".to_string()),
                severity: None,
                assigned_to: None,
                due_date: None,
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();
        assert_eq!(clash.clash_code, "CLH-0001");
        assert_eq!(clash.status, ClashStatus::Open);
        assert!(clash.resolved_date.is_none());

        let resolved = update_clash(
            Extension(clash),
            State(deployment),
            Json(UpdateClash {
                status: Some(ClashStatus::Resolved),
                resolution: Some("Rerouted duct below beam".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();

        assert_eq!(resolved.status, ClashStatus::Resolved);
        assert!(resolved.resolved_date.is_some());
    }
}
