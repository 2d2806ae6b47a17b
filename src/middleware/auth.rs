use axum::response::{Response, IntoResponse};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::Extension;
use serde::Serialize;

use crate::auth::jwt::verify_token;

/// Identity of the caller, attached as a request extension by `require_auth`.
#[derive(Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: String,
    pub name: String,
}

impl AuthContext {
    pub fn is_owner(&self) -> bool {
        self.role == "owner"
    }
}

#[derive(Serialize)]
struct ErrorBody { error: String, code: &'static str }

pub async fn require_auth(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let auth_header = match req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok()) {
        Some(h) => h,
        None => return unauthorized("Missing Authorization header"),
    };

    // Expect "Bearer <token>"
    let token = match auth_header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return unauthorized("Invalid Authorization format"),
    };

    let secret = match std::env::var("JWT_SECRET") {
        Ok(s) => s,
        Err(_) => return unauthorized("Server auth misconfiguration"),
    };

    let claims = match verify_token(token, &secret) {
        Ok(c) => c,
        Err(_) => return unauthorized("Invalid or expired token"),
    };

    req.extensions_mut().insert(AuthContext {
        user_id: claims.sub,
        role: claims.role,
        name: claims.name,
    });

    next.run(req).await
}

/// Owner-only capability gate. Layered after `require_auth`.
pub async fn require_owner(
    Extension(auth): Extension<AuthContext>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !auth.is_owner() {
        let body = axum::Json(ErrorBody {
            error: "Access denied. Owner only.".to_string(),
            code: "forbidden",
        });
        return (StatusCode::FORBIDDEN, body).into_response();
    }
    next.run(req).await
}

fn unauthorized(msg: &str) -> Response {
    let body = axum::Json(ErrorBody { error: msg.to_string(), code: "unauthorized" });
    (StatusCode::UNAUTHORIZED, body).into_response()
}
