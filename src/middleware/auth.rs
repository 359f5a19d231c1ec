// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// Claims do JWT administrativo. A emissão é externa (o portal de gestão
// faz login noutro serviço); aqui só validamos assinatura e expiração.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: Uuid,
    pub name: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

// O middleware em si: protege todas as rotas administrativas.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = decode_admin_token(token, &app_state.jwt_secret)?;
            request.extensions_mut().insert(claims);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidAuthToken)
}

pub fn decode_admin_token(token: &str, secret: &str) -> Result<AdminClaims, AppError> {
    let validation = Validation::default();
    let token_data = decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidAuthToken)?;

    Ok(token_data.claims)
}

// Extrator para obter o administrador autenticado diretamente nos handlers
pub struct AuthenticatedAdmin(pub AdminClaims);

impl AuthenticatedAdmin {
    pub fn display_name(&self) -> String {
        self.0
            .name
            .clone()
            .unwrap_or_else(|| "Administrador".to_string())
    }
}

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminClaims>()
            .cloned()
            .map(AuthenticatedAdmin)
            .ok_or(AppError::InvalidAuthToken)
    }
}
