// src/services/assistance_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AssistanceRepository,
    models::assistance::{Assistance, AssistanceStatus, UrgencyLevel},
    models::communication::AuthorRole,
    services::notification::{Notifier, NotificationTemplate},
    services::store::AssistanceStore,
    services::token,
    services::transition::Transition,
};

/// Fluxos administrativos sobre a assistência: criação (com a emissão dos
/// três tokens de capacidade), mudanças de estado e reenvio do convite.
/// As mudanças de estado passam pela mesma tabela de arestas do gateway,
/// para os dois caminhos nunca divergirem.
#[derive(Clone)]
pub struct AssistanceService {
    repo: AssistanceRepository,
    notifier: Arc<dyn Notifier>,
}

impl AssistanceService {
    pub fn new(repo: AssistanceRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self { repo, notifier }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_assistance(
        &self,
        building_id: Uuid,
        supplier_id: Option<Uuid>,
        intervention_type: &str,
        urgency: UrgencyLevel,
        description: &str,
        estimated_cost: Option<Decimal>,
        created_by: &str,
    ) -> Result<Assistance, AppError> {
        let assistance = self
            .repo
            .create(
                building_id,
                supplier_id,
                intervention_type,
                urgency,
                description,
                estimated_cost,
                &token::mint_token(),
                &token::mint_token(),
                &token::mint_token(),
            )
            .await?;

        self.repo
            .append_activity(
                assistance.id,
                &format!("Assistência criada por {}", created_by),
                created_by,
                AuthorRole::Admin,
            )
            .await?;

        // O convite de aceitação segue já com o link tokenizado; falha de
        // e-mail não desfaz a criação.
        if let Err(e) = self
            .notifier
            .send(&assistance, NotificationTemplate::AcceptanceRequest)
            .await
        {
            tracing::warn!(
                "Assistência #{} criada mas convite não enviado: {}",
                assistance.display_id,
                e
            );
        }

        Ok(assistance)
    }

    pub async fn get(&self, id: Uuid) -> Result<Assistance, AppError> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn list(
        &self,
        status: Option<AssistanceStatus>,
        building_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Assistance>, AppError> {
        self.repo.list(status, building_id, limit, offset).await
    }

    /// Mudança de estado pelo caminho administrativo. A aresta é validada
    /// contra a mesma tabela do motor e aplicada pelo mesmo UPDATE
    /// condicional do gateway.
    pub async fn change_status(
        &self,
        id: Uuid,
        target: AssistanceStatus,
        actor_name: &str,
    ) -> Result<Assistance, AppError> {
        let assistance = self.get(id).await?;

        if !assistance.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition {
                from: assistance.status,
                to: target,
            });
        }

        let transition = Transition {
            new_status: target,
            scheduled_datetime: None,
            rejection_reason: None,
            reschedule_reason: None,
            reset_validation_reminders: false,
        };

        let applied = self
            .repo
            .apply_transition(assistance.id, assistance.status, &transition)
            .await?;
        if !applied {
            return Err(AppError::InvalidTransition {
                from: assistance.status,
                to: target,
            });
        }

        self.repo
            .append_activity(
                assistance.id,
                &format!("{}: estado alterado de {} para {}", actor_name, assistance.status, target),
                actor_name,
                AuthorRole::Admin,
            )
            .await?;

        self.get(id).await
    }

    pub async fn resend_acceptance_request(&self, id: Uuid) -> Result<(), AppError> {
        let assistance = self.get(id).await?;
        self.notifier
            .send(&assistance, NotificationTemplate::AcceptanceRequest)
            .await
    }
}
