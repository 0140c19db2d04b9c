//! Authentication handlers.

use actix_web::{HttpResponse, web};

use lingua_shared::dto::{AuthResponse, LoginRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    request_id: RequestId,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    tracing::info!(request_id = %request_id, email = %mask_email(&req.email), "Login attempt");

    let auth = state
        .authenticator
        .authenticate(&req.email, &req.password)
        .await?;

    let subject = auth.subject.as_deref().ok_or(AppError::Unauthorized)?;
    let token = state
        .tokens
        .generate_token(subject, auth.roles.clone())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
    }))
}

/// `jane@example.com` -> `j***@example.com`.
fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
