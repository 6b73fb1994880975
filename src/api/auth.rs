use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::validation::{validate_email, validate_password, validate_phone};
use super::{ApiError, ApiJson, ApiResponse, AppState};
use crate::services::{AuthResult, Registration};

#[derive(Deserialize)]
pub struct AuthQuery {
    pub apikey: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    pub api_key: String,
}

impl AuthResponse {
    fn new(message: &str, result: AuthResult) -> Self {
        Self {
            message: message.to_string(),
            api_key: result.api_key,
            user: UserResponse {
                id: result.id,
                email: result.email,
                phone: result.phone,
                role: result.role,
                created_at: result.created_at,
            },
        }
    }
}

/// Rejects requests without a known API key. Checks, in order:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <api_key>` header
/// 3. `?apikey=` query parameter, only when `server.allow_api_key_in_query` is set
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let allow_query = state.config().read().await.server.allow_api_key_in_query;

    let api_key = extract_api_key(request.headers()).or_else(|| {
        allow_query
            .then(|| Query::<AuthQuery>::try_from_uri(request.uri()).ok())
            .flatten()
            .and_then(|Query(query)| query.apikey)
            .filter(|key| !key.is_empty())
    });

    if let Some(key) = api_key
        && let Some(principal) = state.shared.auth.authenticate(&key).await?
    {
        tracing::Span::current().record("user_id", &principal);
        return Ok(next.run(request).await);
    }

    Err(ApiError::unauthorized("Invalid or missing API key"))
}

/// Extract API key from headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = validate_password(&payload.password)?.to_string();
    let email = validate_email(&payload.email)?;
    let phone = validate_phone(payload.phone.as_deref())?;

    let result = state
        .shared
        .auth
        .register(Registration {
            email,
            phone,
            password,
            role: payload.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        axum::Json(ApiResponse::success(AuthResponse::new(
            "User registered successfully",
            result,
        ))),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<axum::Json<ApiResponse<AuthResponse>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let result = state
        .shared
        .auth
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(axum::Json(ApiResponse::success(AuthResponse::new(
        "Login successful",
        result,
    ))))
}
