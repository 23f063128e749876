use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    task::{CreateTask, Task, TaskFilter, UpdateTask},
    user::User,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{error::ApiError, middleware::load_task_middleware, routes::require_manage};

pub async fn get_tasks(
    State(deployment): State<Deployment>,
    Query(filter): Query<TaskFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let tasks = Task::find_with_filter(&deployment.db().pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    Extension(task): Extension<Task>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    Extension(user): Extension<User>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    require_manage(&user)?;
    let task = Task::create(&deployment.db().pool, &payload, Some(user.id)).await?;
    tracing::debug!(task = %task.task_code, "Task created");
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    Extension(user): Extension<User>,
    Extension(existing): Extension<Task>,
    State(deployment): State<Deployment>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    require_manage(&user)?;
    let task = Task::update(&deployment.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    Extension(user): Extension<User>,
    Extension(task): Extension<Task>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_manage(&user)?;
    Task::delete(&deployment.db().pool, task.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let task_id_router = Router::new()
        .route("/", get(get_task).put(update_task).delete(delete_task))
        .layer(from_fn_with_state(deployment.clone(), load_task_middleware));

    let tasks_router = Router::new()
        .route("/", get(get_tasks).post(create_task))
        .nest("/{task_id}", task_id_router);

    Router::new().nest("/tasks", tasks_router)
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use db::{
        models::project::{CreateProject, Project},
        types::TaskStatus,
    };
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestEnvGuard;

    async fn setup() -> (TestEnvGuard, Deployment, User, Project) {
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
        let project = Project::create(
            &deployment.db().pool,
            &CreateProject {
                name: "Harbor Point".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (env_guard, deployment, director, project)
    }

    #[tokio::test]
    async fn task_codes_are_sequential() {
        let (_env_guard, deployment, director, project) = setup().await;

        for expected in ["TASK-0001", "TASK-0002"] {
            let response = create_task(
                Extension(director.clone()),
                State(deployment.clone()),
                Json(CreateTask {
                    project_id: project.id,
                    name: format!("Model federation {expected}"),
                    description: None,
                    assigned_to: None,
                    discipline: None,
                    start_date: None,
                    end_date: None,
                    status: None,
                    priority: None,
                    progress: None,
                    estimated_hours: None,
                }),
            )
            .await
            .unwrap();
            assert_eq!(response.0.data.unwrap().task_code, expected);
        }
    }

    #[tokio::test]
    async fn completing_a_task_pins_progress_to_100() {
        let (_env_guard, deployment, director, project) = setup().await;

        let task = create_task(
            Extension(director.clone()),
            State(deployment.clone()),
            Json(CreateTask {
                project_id: project.id,
                name: "Clash resolution round".to_string(),
                description: None,
                assigned_to: None,
                discipline: None,
                start_date: None,
                end_date: None,
                status: None,
                priority: None,
                progress: Some(40),
                estimated_hours: None,
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();

        let updated = update_task(
            Extension(director),
            Extension(task),
            State(deployment),
            Json(UpdateTask {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            }),
        )
        .await
        .unwrap()
        .0
        .data
        .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.progress, 100);
    }

    #[tokio::test]
    async fn creating_a_task_on_a_missing_project_is_not_found() {
        let (_env_guard, deployment, director, _project) = setup().await;

        let err = create_task(
            Extension(director),
            State(deployment),
            Json(CreateTask {
                project_id: Uuid::new_v4(),
                name: "Orphan".to_string(),
                description: None,
                assigned_to: None,
                discipline: None,
                start_date: None,
                end_date: None,
                status: None,
                priority: None,
                progress: None,
                estimated_hours: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
