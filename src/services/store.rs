// src/services/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::assistance::{Assistance, AssistanceStatus};
use crate::models::audit::NewAuditEvent;
use crate::models::communication::{AuthorRole, PhotoCategory};
use crate::services::photo_storage::StoredBlob;
use crate::services::token::TokenScope;
use crate::services::transition::Transition;

/// Seam entre o gateway/lembretes e a persistência. A implementação de
/// produção é o PgAssistanceRepository; os testes usam mocks em memória
/// com contagem de chamadas.
#[async_trait]
pub trait AssistanceStore: Send + Sync {
    /// Resolve o ticket cuja coluna do escopo contém exatamente este valor.
    async fn find_by_token(
        &self,
        scope: TokenScope,
        token: &str,
    ) -> Result<Option<Assistance>, AppError>;

    /// Resolução para as ações de leitura `view`/`portal`: qualquer uma
    /// das três colunas serve.
    async fn find_by_any_token(&self, token: &str) -> Result<Option<Assistance>, AppError>;

    /// UPDATE condicional único (compare-and-set sobre o estado esperado)
    /// gravando estado e campos de efeito colateral em conjunto.
    /// Ok(false) = zero linhas afetadas: outra invocação ganhou a corrida.
    async fn apply_transition(
        &self,
        id: Uuid,
        expected: AssistanceStatus,
        transition: &Transition,
    ) -> Result<bool, AppError>;

    /// Tickets Agendado com data marcada dentro do dia indicado.
    async fn find_scheduled_on(&self, day: NaiveDate) -> Result<Vec<Assistance>, AppError>;

    /// Incrementa o contador de lembretes de validação e carimba o envio.
    async fn mark_validation_reminder_sent(&self, id: Uuid) -> Result<(), AppError>;

    /// Metadados de uma foto já gravada no storage externo.
    async fn append_photo(
        &self,
        assistance_id: Uuid,
        blob: &StoredBlob,
        category: PhotoCategory,
        uploader_name: &str,
        uploader_role: AuthorRole,
        mime_type: &str,
        byte_size: i64,
    ) -> Result<(), AppError>;

    /// Linha de atividade na thread da assistência (append-only).
    async fn append_activity(
        &self,
        assistance_id: Uuid,
        message: &str,
        author_name: &str,
        author_role: AuthorRole,
    ) -> Result<(), AppError>;

    /// Nomes de exibição (edifício, fornecedor) para o eco não sensível.
    async fn display_names(
        &self,
        assistance: &Assistance,
    ) -> Result<(Option<String>, Option<String>), AppError>;
}

/// Destino da trilha de auditoria. Quem escreve nunca depende do sucesso:
/// o embrulho best-effort fica no AuditService.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: NewAuditEvent) -> Result<(), AppError>;
}
