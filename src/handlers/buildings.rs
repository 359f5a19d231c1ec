// src/handlers/buildings.rs

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
    models::building::Building,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildingPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Edifício Aurora")]
    pub name: String,

    #[schema(example = "Rua das Flores 12, Lisboa")]
    pub address: Option<String>,
    pub contact_name: Option<String>,

    #[validate(email(message = "E-mail de contacto inválido"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

// POST /api/buildings
#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Edifícios",
    request_body = CreateBuildingPayload,
    responses(
        (status = 201, description = "Edifício criado", body = Building),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(payload): Json<CreateBuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let building = app_state
        .buildings
        .create(
            &payload.name,
            payload.address.as_deref(),
            payload.contact_name.as_deref(),
            payload.contact_email.as_deref(),
            payload.contact_phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(building)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListBuildingsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

// GET /api/buildings
#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Edifícios",
    params(ListBuildingsQuery),
    responses(
        (status = 200, description = "Lista de edifícios", body = Vec<Building>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<ListBuildingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let buildings = app_state.buildings.list(query.include_inactive).await?;
    Ok((StatusCode::OK, Json(buildings)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBuildingPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email(message = "E-mail de contacto inválido"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

// PATCH /api/buildings/{id}
#[utoipa::path(
    patch,
    path = "/api/buildings/{id}",
    tag = "Edifícios",
    params(("id" = Uuid, Path, description = "ID do edifício")),
    request_body = UpdateBuildingPayload,
    responses(
        (status = 200, description = "Edifício atualizado", body = Building),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_building(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBuildingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let building = app_state
        .buildings
        .update(
            id,
            payload.name.as_deref(),
            payload.address.as_deref(),
            payload.contact_name.as_deref(),
            payload.contact_email.as_deref(),
            payload.contact_phone.as_deref(),
        )
        .await?;

    Ok((StatusCode::OK, Json(building)))
}

// DELETE /api/buildings/{id}  (desativação suave)
#[utoipa::path(
    delete,
    path = "/api/buildings/{id}",
    tag = "Edifícios",
    params(("id" = Uuid, Path, description = "ID do edifício")),
    responses(
        (status = 204, description = "Edifício desativado"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_building(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.buildings.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
