use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    bim_file::{BimFile, CreateBimFile, UpdateBimFile},
    project::Project,
    user::User,
};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{error::ApiError, middleware::load_bim_file_middleware, routes::require_manage};

/// Listing for a single project, mounted under `/projects/{id}/files`.
pub async fn get_project_files(
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<BimFile>>>, ApiError> {
    let files = BimFile::find_by_project(&deployment.db().pool, project.id).await?;
    Ok(ResponseJson(ApiResponse::success(files)))
}

/// Records file metadata against a project. The binary itself lives in the
/// company's document management system; this registry only tracks it.
pub async fn register_project_file(
    Extension(user): Extension<User>,
    Extension(project): Extension<Project>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateBimFile>,
) -> Result<ResponseJson<ApiResponse<BimFile>>, ApiError> {
    let file = BimFile::create(&deployment.db().pool, project.id, &payload, Some(user.id)).await?;
    tracing::debug!(file = %file.file_name, project = %project.project_code, "BIM file registered");
    Ok(ResponseJson(ApiResponse::success(file)))
}

pub async fn get_file(
    Extension(file): Extension<BimFile>,
) -> Result<ResponseJson<ApiResponse<BimFile>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(file)))
}

pub async fn update_file(
    Extension(existing): Extension<BimFile>,
    State(deployment): State<Deployment>,
    Json(payload): Json<UpdateBimFile>,
) -> Result<ResponseJson<ApiResponse<BimFile>>, ApiError> {
    let file = BimFile::update(&deployment.db().pool, existing.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(file)))
}

pub async fn delete_file(
    Extension(user): Extension<User>,
    Extension(file): Extension<BimFile>,
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_manage(&user)?;
    BimFile::delete(&deployment.db().pool, file.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(deployment: &Deployment) -> Router<Deployment> {
    let file_id_router = Router::new()
        .route("/", get(get_file).put(update_file).delete(delete_file))
        .layer(from_fn_with_state(
            deployment.clone(),
            load_bim_file_middleware,
        ));

    Router::new().nest("/files/{file_id}", file_id_router)
}
