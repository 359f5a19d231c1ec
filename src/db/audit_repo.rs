// src/db/audit_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::audit::{AuditEvent, NewAuditEvent},
    services::store::AuditSink,
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Listagem paginada para diagnóstico. A aplicação nunca lê a trilha
    /// de volta fora deste endpoint.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AuditEvent>, AppError> {
        let events = sqlx::query_as::<_, AuditEvent>(
            r#"
            SELECT
                id, event_type, resource_type, resource_id, client_ip,
                user_agent, actor_role, old_values, new_values, details, created_at
            FROM audit_events
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn record(&self, event: NewAuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                event_type, resource_type, resource_id, client_ip,
                user_agent, actor_role, old_values, new_values, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.client_ip)
        .bind(event.user_agent)
        .bind(event.actor_role)
        .bind(event.old_values)
        .bind(event.new_values)
        .bind(event.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
