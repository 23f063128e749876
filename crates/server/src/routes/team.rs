use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    project::Project,
    team::{CreateTeamMember, TeamMember, UpdateTeamMember},
    user::User,
};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, routes::require_manage};

pub async fn get_team(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<TeamMember>>>, ApiError> {
    let members = TeamMember::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

/// Listing for a single project, mounted under `/projects/{id}/team`.
pub async fn get_project_team(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<TeamMember>>>, ApiError> {
    let members = TeamMember::find_by_project(&deployment.db().pool, project.id).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

pub async fn create_team_member(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateTeamMember>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    require_manage(&user)?;
    let member = TeamMember::create(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn update_team_member(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateTeamMember>,
) -> Result<ResponseJson<ApiResponse<TeamMember>>, ApiError> {
    require_manage(&user)?;
    let member = TeamMember::update(&deployment.db().pool, member_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn delete_team_member(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    Path(member_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_manage(&user)?;
    TeamMember::delete(&deployment.db().pool, member_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/team", get(get_team).post(create_team_member))
        .route(
            "/team/{member_id}",
            axum::routing::put(update_team_member).delete(delete_team_member),
        )
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use db::{models::project::CreateProject, types::TeamType};

    use super::*;
    use crate::test_support::TestEnvGuard;

    #[tokio::test]
    async fn team_member_lifecycle() {
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
        let project = Project::create(
            &deployment.db().pool,
            &CreateProject {
                name: "Harbor Point".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let member = create_team_member(
            Extension(director.clone()),
            State(deployment.clone()),
            Json(CreateTeamMember {
                project_id: project.id,
                team_type: TeamType::ProductionArch,
                role: "BIM Modeler".to_string(),
                user_id: None,
                custom_name: Some("A. Mason".to_string()),
                is_lead: None,
                assigned_date: None,
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();
        assert_eq!(member.status, "active");
        assert_eq!(member.assigned_tasks, 0);

        let updated = update_team_member(
            Extension(director.clone()),
            State(deployment.clone()),
            Path(member.id),
            Json(UpdateTeamMember {
                efficiency: Some(87.5),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();
        assert_eq!(updated.efficiency, Some(87.5));

        delete_team_member(
            Extension(director.clone()),
            State(deployment.clone()),
            Path(member.id),
        )
        .await
        .unwrap();

        let err = delete_team_member(Extension(director), State(deployment), Path(member.id))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
