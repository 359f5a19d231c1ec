// src/handlers/communications.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedAdmin,
    models::communication::{AuthorRole, Communication, Photo, PhotoCategory},
};

// =============================================================================
//  MENSAGENS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunicationPayload {
    #[validate(length(min = 1, message = "A mensagem não pode ser vazia"))]
    #[schema(example = "Peça encomendada, visita na próxima semana.")]
    pub message: String,

    #[serde(default)]
    #[schema(example = true)]
    pub visible_contractor: bool,

    #[serde(default)]
    pub visible_tenant: bool,
}

// POST /api/assistances/{id}/communications
#[utoipa::path(
    post,
    path = "/api/assistances/{id}/communications",
    tag = "Comunicações",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    request_body = CreateCommunicationPayload,
    responses(
        (status = 201, description = "Mensagem registada", body = Communication),
        (status = 404, description = "Assistência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_communication(
    State(app_state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommunicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Garante o 404 antes do INSERT: a thread pertence ao agregado.
    app_state.assistances.get(id).await?;

    let communication = app_state
        .communications
        .create_communication(
            id,
            &payload.message,
            &admin.display_name(),
            AuthorRole::Admin,
            true,
            payload.visible_contractor,
            payload.visible_tenant,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(communication)))
}

// GET /api/assistances/{id}/communications
#[utoipa::path(
    get,
    path = "/api/assistances/{id}/communications",
    tag = "Comunicações",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    responses(
        (status = 200, description = "Thread da assistência", body = Vec<Communication>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_communications(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let communications = app_state.communications.list_communications(id).await?;
    Ok((StatusCode::OK, Json(communications)))
}

// =============================================================================
//  FOTOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoPayload {
    #[validate(length(min = 1, message = "A foto não pode ser vazia"))]
    pub photo_base64: String,

    pub category: PhotoCategory,

    #[schema(example = "image/jpeg")]
    pub mime_type: Option<String>,
}

// POST /api/assistances/{id}/photos
#[utoipa::path(
    post,
    path = "/api/assistances/{id}/photos",
    tag = "Comunicações",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    request_body = UploadPhotoPayload,
    responses(
        (status = 201, description = "Foto registada", body = Photo),
        (status = 400, description = "Base64 inválido"),
        (status = 404, description = "Assistência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UploadPhotoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let assistance = app_state.assistances.get(id).await?;

    let bytes = BASE64
        .decode(&payload.photo_base64)
        .map_err(|_| AppError::InvalidActionPayload("Foto em base64 inválida.".to_string()))?;

    let file_name = format!("assistencia-{}-{}.jpg", assistance.display_id, Uuid::new_v4());
    let blob = app_state.photo_storage.store(&file_name, &bytes).await?;

    let photo = app_state
        .communications
        .create_photo(
            id,
            &blob.storage_path,
            &blob.public_url,
            payload.category,
            &admin.display_name(),
            AuthorRole::Admin,
            payload.mime_type.as_deref().unwrap_or("image/jpeg"),
            bytes.len() as i64,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// GET /api/assistances/{id}/photos
#[utoipa::path(
    get,
    path = "/api/assistances/{id}/photos",
    tag = "Comunicações",
    params(("id" = Uuid, Path, description = "ID da assistência")),
    responses(
        (status = 200, description = "Fotos da assistência", body = Vec<Photo>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_photos(
    State(app_state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let photos = app_state.communications.list_photos(id).await?;
    Ok((StatusCode::OK, Json(photos)))
}
