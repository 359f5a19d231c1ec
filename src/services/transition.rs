// src/services/transition.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::models::assistance::AssistanceStatus;
use crate::services::token::TokenScope;

// =============================================================================
//  AÇÕES DO FORNECEDOR
// =============================================================================

/// Ações de escrita aceites pelo gateway. Cada uma só é legitimada pelo
/// token do escopo correspondente (ver TokenScope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplierAction {
    Accept,
    Reject,
    Schedule,
    Reschedule,
    Complete,
}

impl SupplierAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            "schedule" => Some(Self::Schedule),
            "reschedule" => Some(Self::Reschedule),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Schedule => "schedule",
            Self::Reschedule => "reschedule",
            Self::Complete => "complete",
        }
    }

    pub fn scope(&self) -> TokenScope {
        match self {
            Self::Accept | Self::Reject => TokenScope::Acceptance,
            Self::Schedule | Self::Reschedule => TokenScope::Scheduling,
            Self::Complete => TokenScope::Validation,
        }
    }
}

/// Ações de leitura do portal. `view` e `portal` aceitam qualquer um dos
/// três tokens; as restantes são presas ao escopo da ação homónima.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAction {
    Accept,
    Schedule,
    Validate,
    View,
    Portal,
}

impl ReadAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accept" => Some(Self::Accept),
            "schedule" => Some(Self::Schedule),
            "validate" => Some(Self::Validate),
            "view" => Some(Self::View),
            "portal" => Some(Self::Portal),
            _ => None,
        }
    }

    pub fn scope(&self) -> Option<TokenScope> {
        match self {
            Self::Accept => Some(TokenScope::Acceptance),
            Self::Schedule => Some(TokenScope::Scheduling),
            Self::Validate => Some(TokenScope::Validation),
            Self::View | Self::Portal => None,
        }
    }
}

// =============================================================================
//  PAYLOAD (união etiquetada, validada na fronteira)
// =============================================================================

/// Corpo `data` bruto tal como chega no POST do portal.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    pub datetime: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub photo_base64: Option<String>,
}

/// União etiquetada por ação: cada variante carrega apenas o que a sua
/// ação exige. O motor de transição só vê dados já validados.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    Accept { datetime: Option<DateTime<Utc>> },
    Reject { reason: String },
    Schedule { datetime: DateTime<Utc> },
    Reschedule { datetime: DateTime<Utc>, reason: Option<String> },
    Complete,
}

impl ActionPayload {
    pub fn action(&self) -> SupplierAction {
        match self {
            Self::Accept { .. } => SupplierAction::Accept,
            Self::Reject { .. } => SupplierAction::Reject,
            Self::Schedule { .. } => SupplierAction::Schedule,
            Self::Reschedule { .. } => SupplierAction::Reschedule,
            Self::Complete => SupplierAction::Complete,
        }
    }

    /// Valida o `data` bruto contra a ação pedida.
    pub fn from_parts(action: SupplierAction, data: Option<&ActionData>) -> Result<Self, AppError> {
        let datetime = data.and_then(|d| d.datetime);
        let reason = data
            .and_then(|d| d.reason.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        match action {
            SupplierAction::Accept => Ok(Self::Accept { datetime }),
            SupplierAction::Reject => {
                let reason = reason.ok_or_else(|| {
                    AppError::InvalidActionPayload("O motivo da recusa é obrigatório.".to_string())
                })?;
                Ok(Self::Reject { reason })
            }
            SupplierAction::Schedule => {
                let datetime = datetime.ok_or_else(|| {
                    AppError::InvalidActionPayload("A data de agendamento é obrigatória.".to_string())
                })?;
                Ok(Self::Schedule { datetime })
            }
            SupplierAction::Reschedule => {
                let datetime = datetime.ok_or_else(|| {
                    AppError::InvalidActionPayload("A nova data é obrigatória.".to_string())
                })?;
                Ok(Self::Reschedule { datetime, reason })
            }
            SupplierAction::Complete => Ok(Self::Complete),
        }
    }
}

// =============================================================================
//  O MOTOR
// =============================================================================

/// Resultado de uma transição legal: o novo estado mais os campos de
/// efeito colateral que o UPDATE atómico deve gravar em conjunto.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub new_status: AssistanceStatus,
    pub scheduled_datetime: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub reschedule_reason: Option<String>,
    pub reset_validation_reminders: bool,
}

impl Transition {
    fn to(new_status: AssistanceStatus) -> Self {
        Self {
            new_status,
            scheduled_datetime: None,
            rejection_reason: None,
            reschedule_reason: None,
            reset_validation_reminders: false,
        }
    }
}

/// Função pura: (estado atual, payload) → transição ou erro. Não muta nada.
/// A aresta é verificada aqui mesmo que as constraints do banco sejam mais
/// permissivas, porque este é o caminho exposto a atores não confiáveis.
pub fn apply(current: AssistanceStatus, payload: &ActionPayload) -> Result<Transition, AppError> {
    let transition = match payload {
        // accept serve os dois fluxos: "aceitar e agendar já" quando vem
        // data, "aceitar agora, agendar depois" quando não vem.
        ActionPayload::Accept { datetime } => match datetime {
            Some(dt) => Transition {
                scheduled_datetime: Some(*dt),
                ..Transition::to(AssistanceStatus::Agendado)
            },
            None => Transition::to(AssistanceStatus::PendenteAgendamento),
        },
        ActionPayload::Reject { reason } => Transition {
            rejection_reason: Some(reason.clone()),
            ..Transition::to(AssistanceStatus::RecusadaFornecedor)
        },
        ActionPayload::Schedule { datetime } => Transition {
            scheduled_datetime: Some(*datetime),
            ..Transition::to(AssistanceStatus::Agendado)
        },
        ActionPayload::Reschedule { datetime, reason } => Transition {
            scheduled_datetime: Some(*datetime),
            reschedule_reason: reason.clone(),
            ..Transition::to(AssistanceStatus::Agendado)
        },
        ActionPayload::Complete => Transition {
            reset_validation_reminders: true,
            ..Transition::to(AssistanceStatus::PendenteValidacao)
        },
    };

    if !current.can_transition_to(transition.new_status) {
        return Err(AppError::InvalidTransition {
            from: current,
            to: transition.new_status,
        });
    }

    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::models::assistance::AssistanceStatus::*;

    fn dt() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn sample_payload(action: SupplierAction) -> ActionPayload {
        match action {
            SupplierAction::Accept => ActionPayload::Accept { datetime: None },
            SupplierAction::Reject => ActionPayload::Reject { reason: "sem equipa".into() },
            SupplierAction::Schedule => ActionPayload::Schedule { datetime: dt() },
            SupplierAction::Reschedule => {
                ActionPayload::Reschedule { datetime: dt(), reason: None }
            }
            SupplierAction::Complete => ActionPayload::Complete,
        }
    }

    const ALL_STATUSES: [AssistanceStatus; 11] = [
        PendenteRespostaInicial,
        PendenteAceitacao,
        PendenteAgendamento,
        Agendado,
        EmProgresso,
        ReagendamentoSolicitado,
        RecusadaFornecedor,
        PendenteValidacao,
        ValidacaoExpirada,
        Concluido,
        Cancelado,
    ];

    const ALL_ACTIONS: [SupplierAction; 5] = [
        SupplierAction::Accept,
        SupplierAction::Reject,
        SupplierAction::Schedule,
        SupplierAction::Reschedule,
        SupplierAction::Complete,
    ];

    /// Qualquer par (ação, estado) cuja aresta não consta da tabela tem de
    /// falhar com invalid_transition; os pares legais reproduzem exatamente
    /// o estado resultante documentado.
    #[test]
    fn engine_agrees_with_edge_table_exhaustively() {
        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                let payload = sample_payload(action);
                let expected_target = match payload {
                    ActionPayload::Accept { datetime: None } => PendenteAgendamento,
                    ActionPayload::Accept { datetime: Some(_) } => Agendado,
                    ActionPayload::Reject { .. } => RecusadaFornecedor,
                    ActionPayload::Schedule { .. } | ActionPayload::Reschedule { .. } => Agendado,
                    ActionPayload::Complete => PendenteValidacao,
                };

                let result = apply(status, &payload);
                if status.can_transition_to(expected_target) {
                    let t = result.expect("aresta declarada deve ser aceite");
                    assert_eq!(t.new_status, expected_target, "{status} + {:?}", action);
                } else {
                    assert!(
                        matches!(result, Err(AppError::InvalidTransition { .. })),
                        "{status} + {:?} devia ser rejeitado",
                        action
                    );
                }
            }
        }
    }

    /// Cenário A: accept sem data a partir de Pendente Resposta Inicial
    /// leva a Pendente Agendamento; repetir o accept aí falha, porque o
    /// estado já não tem a aresta (o token continua válido, o estado não).
    #[test]
    fn accept_without_datetime_then_repeat() {
        let first = apply(
            PendenteRespostaInicial,
            &ActionPayload::Accept { datetime: None },
        )
        .unwrap();
        assert_eq!(first.new_status, PendenteAgendamento);
        assert_eq!(first.scheduled_datetime, None);

        let second = apply(first.new_status, &ActionPayload::Accept { datetime: None });
        assert!(matches!(second, Err(AppError::InvalidTransition { .. })));
    }

    #[test]
    fn accept_with_datetime_schedules_in_one_step() {
        let t = apply(
            PendenteAceitacao,
            &ActionPayload::Accept { datetime: Some(dt()) },
        )
        .unwrap();
        assert_eq!(t.new_status, Agendado);
        assert_eq!(t.scheduled_datetime, Some(dt()));
    }

    /// Cenário B: reagendar a partir de Agendado continua Agendado, com a
    /// nova data e o motivo gravados.
    #[test]
    fn reschedule_keeps_scheduled_status() {
        let t = apply(
            Agendado,
            &ActionPayload::Reschedule {
                datetime: dt(),
                reason: Some("client unavailable".into()),
            },
        )
        .unwrap();
        assert_eq!(t.new_status, Agendado);
        assert_eq!(t.scheduled_datetime, Some(dt()));
        assert_eq!(t.reschedule_reason.as_deref(), Some("client unavailable"));
    }

    /// Cenário C: complete a partir de Em Progresso zera o contador de
    /// lembretes de validação.
    #[test]
    fn complete_resets_reminder_counter() {
        let t = apply(EmProgresso, &ActionPayload::Complete).unwrap();
        assert_eq!(t.new_status, PendenteValidacao);
        assert!(t.reset_validation_reminders);
    }

    #[test]
    fn reject_requires_reason() {
        let err = ActionPayload::from_parts(SupplierAction::Reject, None);
        assert!(matches!(err, Err(AppError::InvalidActionPayload(_))));

        let data = ActionData { reason: Some("  ".into()), ..Default::default() };
        let err = ActionPayload::from_parts(SupplierAction::Reject, Some(&data));
        assert!(matches!(err, Err(AppError::InvalidActionPayload(_))));
    }

    #[test]
    fn schedule_requires_datetime() {
        let err = ActionPayload::from_parts(SupplierAction::Schedule, Some(&ActionData::default()));
        assert!(matches!(err, Err(AppError::InvalidActionPayload(_))));
    }

    #[test]
    fn rejected_supplier_cannot_accept_again() {
        let result = apply(RecusadaFornecedor, &ActionPayload::Accept { datetime: None });
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }
}
