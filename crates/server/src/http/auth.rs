use axum::{
    Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::session::Session;
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "bim_session";

/// The raw session token of the authenticated request, kept around so the
/// logout handler can invalidate exactly the session that called it.
#[derive(Debug, Clone, Copy)]
pub struct SessionToken(pub Uuid);

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn parse_cookie_token(value: &str) -> Option<&str> {
    for pair in value.split(';') {
        // A pair without '=' is ignored rather than ending the scan.
        let Some((name, token)) = pair.trim().split_once('=') else {
            continue;
        };
        if name.trim() == SESSION_COOKIE {
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            return Some(token);
        }
    }
    None
}

fn extract_request_token(req: &Request) -> Option<String> {
    // 1) Authorization: Bearer <token>
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }

    // 2) bim_session cookie, set by the login handler for browser clients
    if let Some(value) = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_cookie_token)
    {
        return Some(value.to_string());
    }

    None
}

fn is_login_endpoint(req: &Request) -> bool {
    // This middleware is installed on the nested `/api` router, so paths are
    // relative to that prefix (e.g. `/auth/login` instead of `/api/auth/login`).
    req.uri().path() == "/auth/login"
}

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );
    let response = ApiResponse::<()>::error("Unauthorized");
    (axum::http::StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

pub async fn require_session(
    State(deployment): State<Deployment>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_login_endpoint(&req) {
        return next.run(req).await;
    }

    let Some(presented) = extract_request_token(&req) else {
        return unauthorized(&req, "missing_token");
    };
    let Ok(token) = presented.parse::<Uuid>() else {
        return unauthorized(&req, "malformed_token");
    };

    match Session::find_user_by_token(&deployment.db().pool, token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            req.extensions_mut().insert(SessionToken(token));
            next.run(req).await
        }
        Ok(None) => unauthorized(&req, "invalid_or_expired_session"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to resolve session token");
            let response = ApiResponse::<()>::error("Internal server error");
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing_ignores_case_and_whitespace() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("  bearer   abc  "), Some("abc"));
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
    }

    #[test]
    fn cookie_parsing_finds_session_among_other_cookies() {
        assert_eq!(
            parse_cookie_token("theme=dark; bim_session=abc-123; lang=en"),
            Some("abc-123")
        );
        assert_eq!(parse_cookie_token("theme=dark"), None);
        assert_eq!(parse_cookie_token("bim_session="), None);
    }

    #[test]
    fn cookie_parsing_skips_malformed_pairs() {
        assert_eq!(
            parse_cookie_token("junk; bim_session=abc-123"),
            Some("abc-123")
        );
        assert_eq!(parse_cookie_token("junk; more junk"), None);
    }
}
