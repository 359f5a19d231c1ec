// src/services/reminder.rs

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::assistance::Assistance;
use crate::services::notification::{Notifier, NotificationTemplate};
use crate::services::store::AssistanceStore;

/// Resumo devolvido ao disparador externo (cron). O lote corre sempre
/// até ao fim: falhas por ticket acumulam em `errors`, nunca abortam.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    pub same_day_reminders: usize,
    pub next_day_reminders: usize,
    pub errors: Vec<String>,
}

/// Varredura periódica dos tickets Agendado: lembrete no próprio dia da
/// visita e lembrete de validação no dia seguinte. Reexecutar dentro da
/// mesma janela reenvia — limitação conhecida e aceite.
#[derive(Clone)]
pub struct ReminderService {
    store: Arc<dyn AssistanceStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderService {
    pub fn new(store: Arc<dyn AssistanceStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn process(&self) -> ReminderSummary {
        self.process_for(Utc::now().date_naive()).await
    }

    async fn process_for(&self, today: NaiveDate) -> ReminderSummary {
        let mut summary = ReminderSummary::default();

        // Lembrete do próprio dia.
        match self.store.find_scheduled_on(today).await {
            Ok(due_today) => {
                for assistance in due_today {
                    match self.notifier.send(&assistance, NotificationTemplate::SameDayReminder).await {
                        Ok(()) => summary.same_day_reminders += 1,
                        Err(e) => summary.errors.push(format!(
                            "assistência #{}: {}",
                            assistance.display_id, e
                        )),
                    }
                }
            }
            Err(e) => summary.errors.push(format!("busca de agendados de hoje: {}", e)),
        }

        // Dia seguinte à visita: pedir validação e contabilizar o lembrete.
        let yesterday = today - Duration::days(1);
        match self.store.find_scheduled_on(yesterday).await {
            Ok(due_yesterday) => {
                for assistance in due_yesterday {
                    match self.send_day_after(&assistance).await {
                        Ok(()) => summary.next_day_reminders += 1,
                        Err(msg) => summary.errors.push(msg),
                    }
                }
            }
            Err(e) => summary.errors.push(format!("busca de agendados de ontem: {}", e)),
        }

        tracing::info!(
            "Lembretes processados: {} de hoje, {} do dia seguinte, {} erros",
            summary.same_day_reminders,
            summary.next_day_reminders,
            summary.errors.len()
        );
        summary
    }

    async fn send_day_after(&self, assistance: &Assistance) -> Result<(), String> {
        self.notifier
            .send(assistance, NotificationTemplate::DayAfterReminder)
            .await
            .map_err(|e| format!("assistência #{}: {}", assistance.display_id, e))?;

        // Contador e carimbo só depois de um envio bem-sucedido.
        self.store
            .mark_validation_reminder_sent(assistance.id)
            .await
            .map_err(|e| {
                format!(
                    "assistência #{}: lembrete enviado mas não contabilizado: {}",
                    assistance.display_id, e
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    use crate::common::error::AppError;
    use crate::models::assistance::{AssistanceStatus, UrgencyLevel};
    use crate::models::communication::{AuthorRole, PhotoCategory};
    use crate::services::photo_storage::StoredBlob;
    use crate::services::token::TokenScope;
    use crate::services::transition::Transition;

    fn scheduled(display_id: i32) -> Assistance {
        Assistance {
            id: Uuid::new_v4(),
            display_id,
            building_id: Uuid::new_v4(),
            supplier_id: None,
            intervention_type: "Eletricidade".into(),
            urgency: UrgencyLevel::Normal,
            description: "Quadro elétrico".into(),
            status: AssistanceStatus::Agendado,
            acceptance_token: "a".repeat(48),
            scheduling_token: "b".repeat(48),
            validation_token: "c".repeat(48),
            scheduled_datetime: Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()),
            rejection_reason: None,
            reschedule_reason: None,
            validation_reminder_count: 0,
            validation_email_sent_at: None,
            estimated_cost: None,
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    #[derive(Default)]
    struct ScheduleStore {
        today: Vec<Assistance>,
        yesterday: Vec<Assistance>,
        today_date: Option<NaiveDate>,
        marked: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl AssistanceStore for ScheduleStore {
        async fn find_by_token(
            &self,
            _scope: TokenScope,
            _token: &str,
        ) -> Result<Option<Assistance>, AppError> {
            Ok(None)
        }

        async fn find_by_any_token(&self, _token: &str) -> Result<Option<Assistance>, AppError> {
            Ok(None)
        }

        async fn apply_transition(
            &self,
            _id: Uuid,
            _expected: AssistanceStatus,
            _transition: &Transition,
        ) -> Result<bool, AppError> {
            Ok(false)
        }

        async fn find_scheduled_on(&self, day: NaiveDate) -> Result<Vec<Assistance>, AppError> {
            if Some(day) == self.today_date {
                Ok(self.today.clone())
            } else {
                Ok(self.yesterday.clone())
            }
        }

        async fn mark_validation_reminder_sent(&self, id: Uuid) -> Result<(), AppError> {
            self.marked.lock().unwrap().push(id);
            Ok(())
        }

        async fn append_photo(
            &self,
            _assistance_id: Uuid,
            _blob: &StoredBlob,
            _category: PhotoCategory,
            _uploader_name: &str,
            _uploader_role: AuthorRole,
            _mime_type: &str,
            _byte_size: i64,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn append_activity(
            &self,
            _assistance_id: Uuid,
            _message: &str,
            _author_name: &str,
            _author_role: AuthorRole,
        ) -> Result<(), AppError> {
            Ok(())
        }

        async fn display_names(
            &self,
            _assistance: &Assistance,
        ) -> Result<(Option<String>, Option<String>), AppError> {
            Ok((None, None))
        }
    }

    /// Falha nos display_ids indicados, conta todas as tentativas.
    struct FlakyNotifier {
        fail_for: Vec<i32>,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send(
            &self,
            assistance: &Assistance,
            _template: NotificationTemplate,
        ) -> Result<(), AppError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.contains(&assistance.display_id) {
                return Err(anyhow::anyhow!("smtp indisponível").into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let store = Arc::new(ScheduleStore {
            today: vec![scheduled(1), scheduled(2), scheduled(3)],
            today_date: Some(today),
            ..Default::default()
        });
        let notifier = Arc::new(FlakyNotifier { fail_for: vec![2], attempts: AtomicUsize::new(0) });
        let service = ReminderService::new(store.clone(), notifier.clone());

        let summary = service.process_for(today).await;

        assert_eq!(summary.same_day_reminders, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("#2"));
        // Os três foram tentados: a falha do segundo não travou o terceiro.
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn day_after_path_marks_the_reminder_counter() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let a = scheduled(7);
        let marked_id = a.id;
        let store = Arc::new(ScheduleStore {
            yesterday: vec![a],
            today_date: Some(today),
            ..Default::default()
        });
        let notifier = Arc::new(FlakyNotifier { fail_for: vec![], attempts: AtomicUsize::new(0) });
        let service = ReminderService::new(store.clone(), notifier.clone());

        let summary = service.process_for(today).await;

        assert_eq!(summary.next_day_reminders, 1);
        assert!(summary.errors.is_empty());
        assert_eq!(store.marked.lock().unwrap().as_slice(), &[marked_id]);
    }

    #[tokio::test]
    async fn failed_day_after_send_does_not_touch_the_counter() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let store = Arc::new(ScheduleStore {
            yesterday: vec![scheduled(9)],
            today_date: Some(today),
            ..Default::default()
        });
        let notifier = Arc::new(FlakyNotifier { fail_for: vec![9], attempts: AtomicUsize::new(0) });
        let service = ReminderService::new(store.clone(), notifier.clone());

        let summary = service.process_for(today).await;

        assert_eq!(summary.next_day_reminders, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(store.marked.lock().unwrap().is_empty());
    }
}
