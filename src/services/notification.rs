// src/services/notification.rs

use async_trait::async_trait;
use serde_json::json;

use crate::common::error::AppError;
use crate::models::assistance::Assistance;

/// Modelos de e-mail conhecidos pelo serviço externo. O corpo é montado
/// lá; daqui só vai o id do ticket, o template e o contexto mínimo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTemplate {
    AcceptanceRequest,
    SupplierActionNotice,
    ValidationRequest,
    SameDayReminder,
    DayAfterReminder,
}

impl NotificationTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AcceptanceRequest => "acceptance_request",
            Self::SupplierActionNotice => "supplier_action_notice",
            Self::ValidationRequest => "validation_request",
            Self::SameDayReminder => "same_day_reminder",
            Self::DayAfterReminder => "day_after_reminder",
        }
    }
}

/// Colaborador externo de e-mail/notificações.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        assistance: &Assistance,
        template: NotificationTemplate,
    ) -> Result<(), AppError>;
}

/// Implementação de produção: POST para o serviço de notificações.
/// Sem URL configurada o envio degrada para log — útil em desenvolvimento
/// e nos ambientes onde o e-mail ainda não está ligado.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(
        &self,
        assistance: &Assistance,
        template: NotificationTemplate,
    ) -> Result<(), AppError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(
                "Notificação '{}' para assistência #{} (serviço de e-mail não configurado)",
                template.as_str(),
                assistance.display_id
            );
            return Ok(());
        };

        let body = json!({
            "assistanceId": assistance.id,
            "displayId": assistance.display_id,
            "template": template.as_str(),
            "status": assistance.status,
            "scheduledDatetime": assistance.scheduled_datetime,
        });

        let response = self.client.post(endpoint).json(&body).send().await?;
        response.error_for_status()?;

        tracing::info!(
            "Notificação '{}' enviada para assistência #{}",
            template.as_str(),
            assistance.display_id
        );
        Ok(())
    }
}
