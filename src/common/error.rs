use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::assistance::AssistanceStatus;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// A assimetria de detalhe é intencional: o chamador anónimo do portal
// recebe mensagens reduzidas; o detalhe completo vai para o tracing
// e para a trilha de auditoria.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token em falta")]
    MissingToken,

    #[error("Formato de token inválido")]
    InvalidTokenFormat,

    #[error("Ação desconhecida: {0}")]
    InvalidAction(String),

    // Mensagem deliberadamente genérica: não distinguimos "token não existe"
    // de "token existe mas não cobre esta ação" para quem está a adivinhar.
    #[error("{0}")]
    TokenNotFound(String),

    #[error("Transição inválida: {from} → {to}")]
    InvalidTransition {
        from: AssistanceStatus,
        to: AssistanceStatus,
    },

    #[error("Dados da ação inválidos: {0}")]
    InvalidActionPayload(String),

    #[error("Limite de pedidos excedido")]
    RateLimited,

    #[error("Recurso não encontrado")]
    NotFound,

    #[error("Token de autenticação inválido ou ausente")]
    InvalidAuthToken,

    #[error("Registo duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro ao contactar serviço externo")]
    ExternalServiceError(#[from] reqwest::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolve todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // Transição ilegal tem marcador próprio no corpo; o detalhe
            // de/para fica no log, fora do alcance de quem só tem um token.
            AppError::InvalidTransition { from, to } => {
                tracing::warn!("Transição recusada: {} → {}", from, to);
                let body = Json(json!({
                    "error": "invalid_transition",
                    "details": "A ação pedida não é válida no estado atual da assistência.",
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::MissingToken => (StatusCode::BAD_REQUEST, "Token em falta.".to_string()),
            AppError::InvalidTokenFormat => {
                (StatusCode::BAD_REQUEST, "Formato de token inválido.".to_string())
            }
            AppError::InvalidAction(_) => {
                (StatusCode::BAD_REQUEST, "Ação desconhecida.".to_string())
            }
            AppError::InvalidActionPayload(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TokenNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Demasiados pedidos. Tente novamente mais tarde.".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Recurso não encontrado.".to_string()),
            AppError::InvalidAuthToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),

            // Todos os outros (DatabaseError, ExternalServiceError, ...) viram 500.
            // O tracing fica com a mensagem detalhada; o cliente não.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
