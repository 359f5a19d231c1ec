// src/db/assistance_repo.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CommunicationRepository,
    models::assistance::{Assistance, AssistanceStatus, UrgencyLevel},
    models::communication::{AuthorRole, PhotoCategory},
    services::photo_storage::StoredBlob,
    services::store::AssistanceStore,
    services::token::TokenScope,
    services::transition::Transition,
};

const ASSISTANCE_COLUMNS: &str = r#"
    id, display_id, building_id, supplier_id, intervention_type,
    urgency, description, status,
    acceptance_token, scheduling_token, validation_token,
    scheduled_datetime, rejection_reason, reschedule_reason,
    validation_reminder_count, validation_email_sent_at, estimated_cost,
    created_at, updated_at
"#;

#[derive(Clone)]
pub struct AssistanceRepository {
    pool: PgPool,
    communications: CommunicationRepository,
}

impl AssistanceRepository {
    pub fn new(pool: PgPool) -> Self {
        let communications = CommunicationRepository::new(pool.clone());
        Self { pool, communications }
    }

    // =========================================================================
    //  CAMINHO ADMINISTRATIVO (CRUD)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        building_id: Uuid,
        supplier_id: Option<Uuid>,
        intervention_type: &str,
        urgency: UrgencyLevel,
        description: &str,
        estimated_cost: Option<Decimal>,
        acceptance_token: &str,
        scheduling_token: &str,
        validation_token: &str,
    ) -> Result<Assistance, AppError> {
        let query = format!(
            r#"
            INSERT INTO assistances (
                building_id, supplier_id, intervention_type, urgency, description,
                estimated_cost, acceptance_token, scheduling_token, validation_token
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ASSISTANCE_COLUMNS}
            "#
        );

        let assistance = sqlx::query_as::<_, Assistance>(&query)
            .bind(building_id)
            .bind(supplier_id)
            .bind(intervention_type)
            .bind(urgency)
            .bind(description)
            .bind(estimated_cost)
            .bind(acceptance_token)
            .bind(scheduling_token)
            .bind(validation_token)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    // Colisão de token: estatisticamente impossível, mas o
                    // UNIQUE garante que nunca passa despercebida.
                    if db_err.is_unique_violation() {
                        return AppError::UniqueConstraintViolation(
                            "Colisão de token de capacidade.".to_string(),
                        );
                    }
                }
                e.into()
            })?;

        Ok(assistance)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Assistance>, AppError> {
        let query = format!("SELECT {ASSISTANCE_COLUMNS} FROM assistances WHERE id = $1");
        let assistance = sqlx::query_as::<_, Assistance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(assistance)
    }

    pub async fn list(
        &self,
        status: Option<AssistanceStatus>,
        building_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Assistance>, AppError> {
        let query = format!(
            r#"
            SELECT {ASSISTANCE_COLUMNS}
            FROM assistances
            WHERE ($1::assistance_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR building_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let assistances = sqlx::query_as::<_, Assistance>(&query)
            .bind(status)
            .bind(building_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(assistances)
    }
}

// =============================================================================
//  O SEAM DO GATEWAY E DOS LEMBRETES
// =============================================================================

#[async_trait]
impl AssistanceStore for AssistanceRepository {
    async fn find_by_token(
        &self,
        scope: TokenScope,
        token: &str,
    ) -> Result<Option<Assistance>, AppError> {
        // O nome da coluna vem de um enum fechado, nunca do request.
        let query = format!(
            "SELECT {ASSISTANCE_COLUMNS} FROM assistances WHERE {} = $1",
            scope.column()
        );
        let assistance = sqlx::query_as::<_, Assistance>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(assistance)
    }

    async fn find_by_any_token(&self, token: &str) -> Result<Option<Assistance>, AppError> {
        let query = format!(
            r#"
            SELECT {ASSISTANCE_COLUMNS}
            FROM assistances
            WHERE acceptance_token = $1 OR scheduling_token = $1 OR validation_token = $1
            "#
        );
        let assistance = sqlx::query_as::<_, Assistance>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(assistance)
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        expected: AssistanceStatus,
        transition: &Transition,
    ) -> Result<bool, AppError> {
        // Compare-and-set num único statement: estado e campos de efeito
        // colateral mudam juntos ou não mudam. Duas invocações a correr
        // sobre o mesmo ticket resolvem-se aqui, não no chamador.
        let result = sqlx::query(
            r#"
            UPDATE assistances
            SET status = $2,
                scheduled_datetime = COALESCE($3, scheduled_datetime),
                rejection_reason = COALESCE($4, rejection_reason),
                reschedule_reason = COALESCE($5, reschedule_reason),
                validation_reminder_count =
                    CASE WHEN $6 THEN 0 ELSE validation_reminder_count END,
                updated_at = NOW()
            WHERE id = $1 AND status = $7
            "#,
        )
        .bind(id)
        .bind(transition.new_status)
        .bind(transition.scheduled_datetime)
        .bind(transition.rejection_reason.as_deref())
        .bind(transition.reschedule_reason.as_deref())
        .bind(transition.reset_validation_reminders)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_scheduled_on(&self, day: NaiveDate) -> Result<Vec<Assistance>, AppError> {
        let query = format!(
            r#"
            SELECT {ASSISTANCE_COLUMNS}
            FROM assistances
            WHERE status = 'Agendado'
              AND scheduled_datetime >= $1::date
              AND scheduled_datetime < $1::date + INTERVAL '1 day'
            ORDER BY scheduled_datetime ASC
            "#
        );
        let assistances = sqlx::query_as::<_, Assistance>(&query)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;
        Ok(assistances)
    }

    async fn mark_validation_reminder_sent(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE assistances
            SET validation_reminder_count = validation_reminder_count + 1,
                validation_email_sent_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_photo(
        &self,
        assistance_id: Uuid,
        blob: &StoredBlob,
        category: PhotoCategory,
        uploader_name: &str,
        uploader_role: AuthorRole,
        mime_type: &str,
        byte_size: i64,
    ) -> Result<(), AppError> {
        self.communications
            .create_photo(
                assistance_id,
                &blob.storage_path,
                &blob.public_url,
                category,
                uploader_name,
                uploader_role,
                mime_type,
                byte_size,
            )
            .await?;
        Ok(())
    }

    async fn append_activity(
        &self,
        assistance_id: Uuid,
        message: &str,
        author_name: &str,
        author_role: AuthorRole,
    ) -> Result<(), AppError> {
        self.communications
            .create_communication(assistance_id, message, author_name, author_role, true, true, false)
            .await?;
        Ok(())
    }

    async fn display_names(
        &self,
        assistance: &Assistance,
    ) -> Result<(Option<String>, Option<String>), AppError> {
        let building: Option<(String,)> =
            sqlx::query_as("SELECT name FROM buildings WHERE id = $1")
                .bind(assistance.building_id)
                .fetch_optional(&self.pool)
                .await?;

        let supplier: Option<(String,)> = match assistance.supplier_id {
            Some(supplier_id) => sqlx::query_as("SELECT name FROM suppliers WHERE id = $1")
                .bind(supplier_id)
                .fetch_optional(&self.pool)
                .await?,
            None => None,
        };

        Ok((building.map(|b| b.0), supplier.map(|s| s.0)))
    }
}
