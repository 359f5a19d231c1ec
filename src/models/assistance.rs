// src/models/assistance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE assistance_status do banco.
// Os nomes com espaço/acento são os valores canônicos que o frontend
// e os e-mails já conhecem, então o rename é feito variante a variante.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "assistance_status")]
pub enum AssistanceStatus {
    #[sqlx(rename = "Pendente Resposta Inicial")]
    #[serde(rename = "Pendente Resposta Inicial")]
    PendenteRespostaInicial,

    #[sqlx(rename = "Pendente Aceitação")]
    #[serde(rename = "Pendente Aceitação")]
    PendenteAceitacao,

    #[sqlx(rename = "Pendente Agendamento")]
    #[serde(rename = "Pendente Agendamento")]
    PendenteAgendamento,

    #[sqlx(rename = "Agendado")]
    #[serde(rename = "Agendado")]
    Agendado,

    #[sqlx(rename = "Em Progresso")]
    #[serde(rename = "Em Progresso")]
    EmProgresso,

    #[sqlx(rename = "Reagendamento Solicitado")]
    #[serde(rename = "Reagendamento Solicitado")]
    ReagendamentoSolicitado,

    #[sqlx(rename = "Recusada Fornecedor")]
    #[serde(rename = "Recusada Fornecedor")]
    RecusadaFornecedor,

    #[sqlx(rename = "Pendente Validação")]
    #[serde(rename = "Pendente Validação")]
    PendenteValidacao,

    #[sqlx(rename = "Validação Expirada")]
    #[serde(rename = "Validação Expirada")]
    ValidacaoExpirada,

    #[sqlx(rename = "Concluído")]
    #[serde(rename = "Concluído")]
    Concluido,

    #[sqlx(rename = "Cancelado")]
    #[serde(rename = "Cancelado")]
    Cancelado,
}

impl AssistanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendenteRespostaInicial => "Pendente Resposta Inicial",
            Self::PendenteAceitacao => "Pendente Aceitação",
            Self::PendenteAgendamento => "Pendente Agendamento",
            Self::Agendado => "Agendado",
            Self::EmProgresso => "Em Progresso",
            Self::ReagendamentoSolicitado => "Reagendamento Solicitado",
            Self::RecusadaFornecedor => "Recusada Fornecedor",
            Self::PendenteValidacao => "Pendente Validação",
            Self::ValidacaoExpirada => "Validação Expirada",
            Self::Concluido => "Concluído",
            Self::Cancelado => "Cancelado",
        }
    }

    /// Tabela de arestas do ciclo de vida. É a única fonte de verdade sobre
    /// quais transições são legais; tanto o gateway do fornecedor quanto o
    /// caminho administrativo passam por aqui.
    pub fn allowed_targets(&self) -> &'static [AssistanceStatus] {
        use AssistanceStatus::*;
        match self {
            // O fornecedor pode aceitar/recusar antes mesmo da transição
            // interna de primeira resposta, então este estado carrega as
            // arestas de Pendente Aceitação além da aresta administrativa.
            PendenteRespostaInicial => &[
                PendenteAceitacao,
                PendenteAgendamento,
                Agendado,
                RecusadaFornecedor,
                Cancelado,
            ],
            PendenteAceitacao => &[PendenteAgendamento, Agendado, RecusadaFornecedor, Cancelado],
            PendenteAgendamento => &[Agendado, Cancelado, RecusadaFornecedor],
            // A auto-aresta é o reagendamento: continua Agendado, muda a data.
            Agendado => &[EmProgresso, ReagendamentoSolicitado, Cancelado, Agendado],
            EmProgresso => &[PendenteValidacao, Cancelado],
            PendenteValidacao => &[Concluido, ValidacaoExpirada, Cancelado],
            ValidacaoExpirada => &[PendenteValidacao, Concluido, Cancelado],
            ReagendamentoSolicitado => &[Agendado, Cancelado],
            RecusadaFornecedor => &[PendenteAceitacao, Cancelado],
            Concluido => &[Cancelado],
            Cancelado => &[PendenteRespostaInicial, PendenteAceitacao],
        }
    }

    pub fn can_transition_to(&self, target: AssistanceStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

impl fmt::Display for AssistanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "urgency_level")]
pub enum UrgencyLevel {
    #[sqlx(rename = "Normal")]
    #[serde(rename = "Normal")]
    Normal,
    #[sqlx(rename = "Urgente")]
    #[serde(rename = "Urgente")]
    Urgente,
    #[sqlx(rename = "Emergência")]
    #[serde(rename = "Emergência")]
    Emergencia,
}

// --- A RAIZ DO AGREGADO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assistance {
    pub id: Uuid,
    #[schema(example = 42)]
    pub display_id: i32,
    pub building_id: Uuid,
    pub supplier_id: Option<Uuid>,

    #[schema(example = "Canalização")]
    pub intervention_type: String,
    pub urgency: UrgencyLevel,
    #[schema(example = "Fuga de água na coluna do 3º esquerdo")]
    pub description: String,
    pub status: AssistanceStatus,

    // Tokens de capacidade. Nunca aparecem em respostas públicas:
    // quem serializa para o portal usa SupplierAssistanceView.
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub acceptance_token: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub scheduling_token: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub validation_token: String,

    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub reschedule_reason: Option<String>,
    pub validation_reminder_count: i32,
    pub validation_email_sent_at: Option<DateTime<Utc>>,
    #[schema(example = "350.00")]
    pub estimated_cost: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projeção não sensível devolvida ao portal do fornecedor.
/// É o subconjunto de "eco" do contrato público: nada de tokens,
/// nada de campos internos.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierAssistanceView {
    pub id: Uuid,
    pub display_id: i32,
    pub description: String,
    pub status: AssistanceStatus,
    pub urgency: UrgencyLevel,
    pub intervention_type: String,
    pub building: Option<String>,
    pub supplier: Option<String>,
    pub scheduled_datetime: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_canonical_strings() {
        let s = serde_json::to_string(&AssistanceStatus::PendenteValidacao).unwrap();
        assert_eq!(s, "\"Pendente Validação\"");
        let back: AssistanceStatus = serde_json::from_str("\"Recusada Fornecedor\"").unwrap();
        assert_eq!(back, AssistanceStatus::RecusadaFornecedor);
    }

    #[test]
    fn concluido_only_cancels() {
        assert_eq!(
            AssistanceStatus::Concluido.allowed_targets(),
            &[AssistanceStatus::Cancelado]
        );
    }

    #[test]
    fn cancelado_can_reopen() {
        assert!(AssistanceStatus::Cancelado.can_transition_to(AssistanceStatus::PendenteRespostaInicial));
        assert!(AssistanceStatus::Cancelado.can_transition_to(AssistanceStatus::PendenteAceitacao));
        assert!(!AssistanceStatus::Cancelado.can_transition_to(AssistanceStatus::Agendado));
    }
}
