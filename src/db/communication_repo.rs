// src/db/communication_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::communication::{AuthorRole, Communication, Photo, PhotoCategory},
};

#[derive(Clone)]
pub struct CommunicationRepository {
    pool: PgPool,
}

impl CommunicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  THREAD DE MENSAGENS (append-only)
    // =========================================================================

    pub async fn create_communication(
        &self,
        assistance_id: Uuid,
        message: &str,
        author_name: &str,
        author_role: AuthorRole,
        visible_internal: bool,
        visible_contractor: bool,
        visible_tenant: bool,
    ) -> Result<Communication, AppError> {
        let communication = sqlx::query_as::<_, Communication>(
            r#"
            INSERT INTO communications (
                assistance_id, message, author_name, author_role,
                visible_internal, visible_contractor, visible_tenant
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, assistance_id, message, author_name, author_role,
                visible_internal, visible_contractor, visible_tenant, created_at
            "#,
        )
        .bind(assistance_id)
        .bind(message)
        .bind(author_name)
        .bind(author_role)
        .bind(visible_internal)
        .bind(visible_contractor)
        .bind(visible_tenant)
        .fetch_one(&self.pool)
        .await?;

        Ok(communication)
    }

    pub async fn list_communications(
        &self,
        assistance_id: Uuid,
    ) -> Result<Vec<Communication>, AppError> {
        let communications = sqlx::query_as::<_, Communication>(
            r#"
            SELECT
                id, assistance_id, message, author_name, author_role,
                visible_internal, visible_contractor, visible_tenant, created_at
            FROM communications
            WHERE assistance_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(assistance_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(communications)
    }

    // =========================================================================
    //  FOTOS (metadados; o blob vive no storage externo)
    // =========================================================================

    pub async fn create_photo(
        &self,
        assistance_id: Uuid,
        storage_path: &str,
        public_url: &str,
        category: PhotoCategory,
        uploader_name: &str,
        uploader_role: AuthorRole,
        mime_type: &str,
        byte_size: i64,
    ) -> Result<Photo, AppError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (
                assistance_id, storage_path, public_url, category,
                uploader_name, uploader_role, mime_type, byte_size
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING
                id, assistance_id, storage_path, public_url, category,
                uploader_name, uploader_role, mime_type, byte_size, created_at
            "#,
        )
        .bind(assistance_id)
        .bind(storage_path)
        .bind(public_url)
        .bind(category)
        .bind(uploader_name)
        .bind(uploader_role)
        .bind(mime_type)
        .bind(byte_size)
        .fetch_one(&self.pool)
        .await?;

        Ok(photo)
    }

    pub async fn list_photos(&self, assistance_id: Uuid) -> Result<Vec<Photo>, AppError> {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT
                id, assistance_id, storage_path, public_url, category,
                uploader_name, uploader_role, mime_type, byte_size, created_at
            FROM photos
            WHERE assistance_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(assistance_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }
}
