use axum::{extract::State, http::StatusCode, Extension, Json};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::instrument;

use crate::auth::jwt::sign_token;
use crate::dtos::user::{LoginRequest, LoginResponse, RegisterUserRequest, UserResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::user::User;
use crate::state::AppState;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at";

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

// POST /auth/register - owner-only (staff accounts are provisioned by the owner)
#[instrument(skip(db_pool, payload))]
pub async fn register_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if payload.role != "owner" && payload.role != "staff" {
        return Err(AppError::validation("role must be owner or staff"));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::validation("A valid email is required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("Password must be at least 6 characters"));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(payload.name.trim())
    .bind(payload.email.trim().to_lowercase())
    .bind(password_hash)
    .bind(&payload.role)
    .fetch_one(&db_pool)
    .await
    .map_err(|e| {
        if let Some(db_err) = e.as_database_error() {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::conflict("Email already registered");
            }
        }
        AppError::Database(e)
    })?;

    Ok((StatusCode::CREATED, Json(user_response(user))))
}

// POST /auth/login - public
#[instrument(skip(db_pool, payload))]
pub async fn login_user(
    State(AppState { db_pool }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::validation("Password is required"));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(AppError::forbidden("Account is inactive"));
    }

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;

    if !ok {
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::internal("JWT secret not configured"))?;

    let token = sign_token(user.id, &user.role, &user.name, &secret)?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in_seconds: 8 * 60 * 60,
        user: user_response(user),
    }))
}

// GET /auth/me - profile of the authenticated caller
#[instrument(skip(db_pool, auth))]
pub async fn get_me(
    State(AppState { db_pool }): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(auth.user_id)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user_response(user)))
}
