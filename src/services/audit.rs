// src/services/audit.rs

use std::sync::Arc;

use crate::models::audit::{NewAuditEvent, SecurityEventType};
use crate::services::store::AuditSink;

/// Escrita best-effort na trilha de segurança. Do ponto de vista de quem
/// chama é fire-and-forget: uma falha aqui é registada no log local e
/// nunca propaga para falhar a operação primária.
#[derive(Clone)]
pub struct AuditService {
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn security_event(&self, event: NewAuditEvent) {
        let event_type = event.event_type;
        if let Err(e) = self.sink.record(event).await {
            tracing::error!(
                "Falha ao gravar evento de auditoria {}: {}",
                event_type.as_str(),
                e
            );
        }
    }
}

/// Construtor compacto para os eventos do gateway, onde quase tudo
/// varia só em tipo, recurso e detalhe.
pub fn gateway_event(
    event_type: SecurityEventType,
    resource_id: Option<String>,
    client_ip: &str,
    user_agent: Option<&str>,
    details: Option<String>,
) -> NewAuditEvent {
    NewAuditEvent {
        event_type,
        resource_type: "assistance",
        resource_id,
        client_ip: client_ip.to_string(),
        user_agent: user_agent.map(str::to_string),
        actor_role: Some("supplier".to_string()),
        old_values: None,
        new_values: None,
        details,
    }
}
