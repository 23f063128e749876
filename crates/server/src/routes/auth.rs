use axum::{
    Extension, Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use db::models::{
    company::Company,
    user::{CreateUser, User, UserError, UserRole},
};
use deployment::Deployment;
use serde::{Deserialize, Serialize};
use services::services::auth::AuthError;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    http::{SESSION_COOKIE, SessionToken},
    routes::require_manage,
};

/// Both fields optional so a partial payload reaches the handler and gets
/// the envelope-shaped 400 instead of a bare deserialization rejection.
#[derive(Debug, Deserialize, ts_rs::TS)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ts_rs::TS)]
pub struct LoginResponse {
    pub token: Uuid,
    pub user: User,
}

#[derive(Debug, Deserialize, ts_rs::TS)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub department: Option<String>,
    pub phone: Option<String>,
}

fn session_cookie(value: &str, max_age: Option<i64>) -> String {
    match max_age {
        Some(age) => format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={age}"),
        None => format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/"),
    }
}

pub async fn login(
    State(deployment): State<Deployment>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.as_deref().unwrap_or("").trim();
    let password = payload.password.as_deref().unwrap_or("");
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (session, user) =
        services::services::auth::login(&deployment.db().pool, email, password).await?;

    tracing::info!(user = %user.email, "User signed in");

    // Cookie lifetime matches the session row TTL.
    let max_age = db::models::session::SESSION_TTL_HOURS * 60 * 60;
    let cookie = session_cookie(&session.id.to_string(), Some(max_age));
    let welcome = format!("Welcome back, {}", user.full_name());
    Ok((
        [(header::SET_COOKIE, cookie)],
        ResponseJson(ApiResponse::success_with_message(
            LoginResponse {
                token: session.id,
                user,
            },
            welcome,
        )),
    )
        .into_response())
}

pub async fn logout(
    State(deployment): State<Deployment>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> Result<Response, ApiError> {
    services::services::auth::logout(&deployment.db().pool, token).await?;
    let cookie = session_cookie("", Some(0));
    Ok((
        [(header::SET_COOKIE, cookie)],
        ResponseJson(ApiResponse::success(())),
    )
        .into_response())
}

/// Session middleware has already validated the token by the time this runs,
/// so reaching it at all means the session is good.
pub async fn check_session(
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub async fn get_users(
    State(deployment): State<Deployment>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let users = User::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub async fn create_user(
    Extension(current_user): Extension<User>,
    State(deployment): State<Deployment>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    require_manage(&current_user)?;

    if payload.password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty".to_string()));
    }

    let company = Company::find_default(&deployment.db().pool)
        .await?
        .ok_or(UserError::CompanyNotFound)?;
    let password_hash =
        bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(AuthError::from)?;

    let user = User::create(
        &deployment.db().pool,
        company.id,
        &CreateUser {
            email: payload.email,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role: payload.role,
            department: payload.department,
            phone: payload.phone,
        },
    )
    .await?;

    tracing::info!(user = %user.email, role = %user.role, "User account created");
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub fn router() -> Router<Deployment> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/check", get(check_session))
        .route("/users", get(get_users).post(create_user))
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode};
    use chrono::Utc;

    use super::*;
    use crate::test_support::TestEnvGuard;

    fn viewer() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "viewer@datumauto.com".to_string(),
            first_name: "Only".to_string(),
            last_name: "Looking".to_string(),
            role: UserRole::Viewer,
            department: None,
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn create_user_rejects_non_management_roles() {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();
        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let _env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();

        let payload = CreateUserRequest {
            email: "new@datumauto.com".to_string(),
            password: "secret".to_string(),
            first_name: "New".to_string(),
            last_name: "Person".to_string(),
            role: UserRole::BimModeler,
            department: None,
            phone: None,
        };

        let err = create_user(Extension(viewer()), State(deployment), Json(payload))
            .await
            .unwrap_err();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
    }

    #[tokio::test]
    async fn duplicate_email_returns_conflict() {
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

        let payload = CreateUserRequest {
            email: director.email.clone(),
            password: "secret".to_string(),
            first_name: "Dup".to_string(),
            last_name: "Licate".to_string(),
            role: UserRole::BimModeler,
            department: None,
            phone: None,
        };

        let err = create_user(
            Extension(director),
            State(deployment),
            Json(payload),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
