// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Códigos de evento da trilha de segurança. Cada ramo do pipeline do
/// gateway tem o seu próprio código para que a análise posterior consiga
/// separar força bruta de erro de formato de uso legítimo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    RateLimitExceeded,
    MissingToken,
    InvalidTokenFormat,
    InvalidAction,
    TokenNotFound,
    InvalidTransition,
    UpdateConflict,
    TokenAccessSuccess,
}

impl SecurityEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            Self::InvalidAction => "INVALID_ACTION",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::UpdateConflict => "UPDATE_CONFLICT",
            Self::TokenAccessSuccess => "TOKEN_ACCESS_SUCCESS",
        }
    }
}

/// Evento ainda não persistido, montado pelo chamador.
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub event_type: SecurityEventType,
    pub resource_type: &'static str,
    pub resource_id: Option<String>,
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub actor_role: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: i64,
    pub event_type: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub actor_role: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
