// src/handlers/assistances.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedAdmin,
    models::assistance::{Assistance, AssistanceStatus, UrgencyLevel},
};

// =============================================================================
//  CRIAÇÃO E CONSULTA
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistancePayload {
    pub building_id: Uuid,
    pub supplier_id: Option<Uuid>,

    #[validate(length(min = 2, message = "O tipo de intervenção deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Canalização")]
    pub intervention_type: String,

    pub urgency: UrgencyLevel,

    #[validate(length(min = 5, message = "A descrição deve ter no mínimo 5 caracteres"))]
    #[schema(example = "Fuga de água na coluna do 3º esquerdo")]
    pub description: String,

    #[schema(example = "350.00")]
    pub estimated_cost: Option<Decimal>,
}

// POST /api/assistances
#[utoipa::path(
    post,
    path = "/api/assistances",
    tag = "Assistências",
    request_body = CreateAssistancePayload,
    responses(
        (status = 201, description = "Assistência criada", body = Assistance),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_assistance(
    State(app_state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(payload): Json<CreateAssistancePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let assistance = app_state
        .assistances
        .create_assistance(
            payload.building_id,
            payload.supplier_id,
            &payload.intervention_type,
            payload.urgency,
            &payload.description,
            payload.estimated_cost,
            &admin.display_name(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(assistance)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAssistancesQuery {
    pub status: Option<AssistanceStatus>,
    pub building_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// GET /api/assistances
#[utoipa::path(
    get,
    path = "/api/assistances",
    tag = "Assistências",
    params(ListAssistancesQuery),
    responses(
        (status = 200, description = "Lista de assistências", body = Vec<Assistance>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_assistances(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ListAssistancesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let assistances = app_state
        .assistances
        .list(
            query.status,
            query.building_id,
            query.limit.unwrap_or(50).clamp(1, 200),
            query.offset.unwrap_or(0).max(0),
        )
        .await?;

    Ok((StatusCode::OK, Json(assistances)))
}

// GET /api/assistances/{id}
#[utoipa::path(
    get,
    path = "/api/assistances/{id}",
    tag = "Assistências",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    responses(
        (status = 200, description = "Detalhe da assistência", body = Assistance),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_assistance(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let assistance = app_state.assistances.get(id).await?;
    Ok((StatusCode::OK, Json(assistance)))
}

// =============================================================================
//  ESTADO E CONVITES
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    #[schema(example = "Em Progresso")]
    pub status: AssistanceStatus,
}

// PATCH /api/assistances/{id}/status
#[utoipa::path(
    patch,
    path = "/api/assistances/{id}/status",
    tag = "Assistências",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Estado alterado", body = Assistance),
        (status = 400, description = "Transição inválida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assistance = app_state
        .assistances
        .change_status(id, payload.status, &admin.display_name())
        .await?;

    Ok((StatusCode::OK, Json(assistance)))
}

// POST /api/assistances/{id}/resend
#[utoipa::path(
    post,
    path = "/api/assistances/{id}/resend",
    tag = "Assistências",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    responses(
        (status = 204, description = "Convite reenviado"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn resend_acceptance_request(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.assistances.resend_acceptance_request(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  FOLHA DE SERVIÇO (PDF)
// =============================================================================

// GET /api/assistances/{id}/service-order.pdf
#[utoipa::path(
    get,
    path = "/api/assistances/{id}/service-order.pdf",
    tag = "Assistências",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    responses(
        (status = 200, description = "Folha de serviço em PDF", content_type = "application/pdf"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn service_order_pdf(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.documents.generate_service_order_pdf(id).await?;

    // Configura os headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"assistencia_{}.pdf\"", id),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
