// src/models/communication.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "author_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthorRole {
    Admin,
    Contractor,
    Supplier,
    Tenant,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "photo_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Problema,
    Progresso,
    Resultado,
    Diagnostico,
    Outros,
}

// Entrada da linha do tempo. Criada por qualquer uma das partes,
// nunca alterada, nunca apagada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: Uuid,
    pub assistance_id: Uuid,
    #[schema(example = "Fornecedor: Ação accept realizada com sucesso")]
    pub message: String,
    pub author_name: String,
    pub author_role: AuthorRole,
    pub visible_internal: bool,
    pub visible_contractor: bool,
    pub visible_tenant: bool,
    pub created_at: DateTime<Utc>,
}

// Foto anexada. Imutável depois de criada; o blob vive no storage externo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub assistance_id: Uuid,
    pub storage_path: String,
    pub public_url: String,
    pub category: PhotoCategory,
    pub uploader_name: String,
    pub uploader_role: AuthorRole,
    #[schema(example = "image/jpeg")]
    pub mime_type: String,
    pub byte_size: i64,
    pub created_at: DateTime<Utc>,
}
