use axum::{Router, middleware::from_fn_with_state, routing::get};
use deployment::Deployment;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::routes;

mod auth;

pub use auth::{SESSION_COOKIE, SessionToken};

pub fn router(deployment: Deployment) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::projects::router(&deployment))
        .merge(routes::tasks::router(&deployment))
        .merge(routes::team::router())
        .merge(routes::files::router(&deployment))
        .merge(routes::clashes::router(&deployment))
        .merge(routes::stats::router())
        .merge(routes::import::router())
        .merge(routes::assistant::router())
        .layer(from_fn_with_state(
            deployment.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(utils::assets::public_dir()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use deployment::Deployment;
    use services::services::auth::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::test_support::TestEnvGuard;

    async fn setup_deployment() -> (TestEnvGuard, Deployment) {
        let temp_root = std::env::temp_dir().join(format!("bim-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();

        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let env_guard = TestEnvGuard::new(&temp_root, db_url);

        let deployment = Deployment::new().await.unwrap();

        (env_guard, deployment)
    }

    async fn login_token(app: &axum::Router) -> String {
        let payload = serde_json::json!({
            "email": DEFAULT_ADMIN_EMAIL,
            "password": DEFAULT_ADMIN_PASSWORD,
        });
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json.pointer("/data/token")
            .and_then(|v| v.as_str())
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_requires_session() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            json.get("message").and_then(|v| v.as_str()),
            Some("Unauthorized")
        );
    }

    #[tokio::test]
    async fn login_token_unlocks_api() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let token = login_token(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(true));
        assert!(json.get("data").map(|v| v.is_array()).unwrap_or(false));
    }

    #[tokio::test]
    async fn login_with_missing_fields_is_bad_request() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("success").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            json.get("message").and_then(|v| v.as_str()),
            Some("Email and password are required")
        );
    }

    #[tokio::test]
    async fn login_cookie_carries_session_lifetime() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let payload = serde_json::json!({
            "email": DEFAULT_ADMIN_EMAIL,
            "password": DEFAULT_ADMIN_PASSWORD,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("bim_session="));
        assert!(cookie.contains("Max-Age=86400"));
    }

    #[tokio::test]
    async fn session_cookie_also_authenticates() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let token = login_token(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/check")
                    .header(header::COOKIE, format!("bim_session={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (_env_guard, deployment) = setup_deployment().await;
        let app = super::router(deployment);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .header(header::AUTHORIZATION, "Bearer not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
