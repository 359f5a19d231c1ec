// src/handlers/audit.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedAdmin,
    models::audit::AuditEvent,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAuditEventsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// GET /api/audit-events
//
// Diagnóstico: o único ponto onde a aplicação lê a trilha de volta.
#[utoipa::path(
    get,
    path = "/api/audit-events",
    tag = "Auditoria",
    params(ListAuditEventsQuery),
    responses(
        (status = 200, description = "Eventos de segurança mais recentes", body = Vec<AuditEvent>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_audit_events(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ListAuditEventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = app_state
        .audit
        .list(
            query.limit.unwrap_or(100).clamp(1, 500),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;

    Ok((StatusCode::OK, Json(events)))
}
