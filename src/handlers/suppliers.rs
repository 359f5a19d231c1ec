// src/handlers/suppliers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedAdmin,
    models::supplier::Supplier,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Canalizações Silva Lda")]
    pub name: String,

    #[validate(email(message = "E-mail inválido"))]
    #[schema(example = "geral@canalizacoessilva.pt")]
    pub email: Option<String>,
    pub phone: Option<String>,

    #[schema(example = "Canalização")]
    pub specialty: Option<String>,
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Fornecedores",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .suppliers
        .create(
            &payload.name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.specialty.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListSuppliersQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Fornecedores",
    params(ListSuppliersQuery),
    responses(
        (status = 200, description = "Lista de fornecedores", body = Vec<Supplier>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ListSuppliersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = app_state.suppliers.list(query.include_inactive).await?;
    Ok((StatusCode::OK, Json(suppliers)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: Option<String>,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
}

// PATCH /api/suppliers/{id}
#[utoipa::path(
    patch,
    path = "/api/suppliers/{id}",
    tag = "Fornecedores",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Fornecedor atualizado", body = Supplier),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let supplier = app_state
        .suppliers
        .update(
            id,
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            payload.specialty.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(supplier)))
}

// DELETE /api/suppliers/{id}  (desativação suave)
#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Fornecedores",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor desativado"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_supplier(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.suppliers.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
