// src/services/gateway.rs

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::messages;
use crate::models::assistance::{Assistance, SupplierAssistanceView};
use crate::models::audit::SecurityEventType;
use crate::models::communication::{AuthorRole, PhotoCategory};
use crate::services::audit::{AuditService, gateway_event};
use crate::services::notification::{Notifier, NotificationTemplate};
use crate::services::photo_storage::PhotoStorage;
use crate::services::rate_limit::RateLimiter;
use crate::services::store::AssistanceStore;
use crate::services::token;
use crate::services::transition::{self, ActionData, ActionPayload, ReadAction, SupplierAction};

/// Contexto do pedido anónimo: identidade de rede para rate limit e
/// auditoria, idioma para as mensagens do portal.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub lang: String,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub message: String,
}

/// O gateway de ações do fornecedor: compõe, por esta ordem e com
/// curto-circuito, rate limit → validação sintática → resolução/
/// autorização → transição → persistência atómica → auditoria.
/// As etapas 2–5 são locais e não mutam nada; só a 6 escreve no ticket.
#[derive(Clone)]
pub struct SupplierActionService {
    store: Arc<dyn AssistanceStore>,
    audit: AuditService,
    rate_limiter: Arc<dyn RateLimiter>,
    notifier: Arc<dyn Notifier>,
    photos: Arc<dyn PhotoStorage>,
}

impl SupplierActionService {
    pub fn new(
        store: Arc<dyn AssistanceStore>,
        audit: AuditService,
        rate_limiter: Arc<dyn RateLimiter>,
        notifier: Arc<dyn Notifier>,
        photos: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self { store, audit, rate_limiter, notifier, photos }
    }

    // =========================================================================
    //  CAMINHO DE LEITURA (GET supplier-route)
    // =========================================================================

    pub async fn fetch(
        &self,
        action_raw: &str,
        token_raw: Option<&str>,
        meta: &RequestMeta,
    ) -> Result<SupplierAssistanceView, AppError> {
        self.check_rate_limit(meta).await?;
        let token = self.check_token_syntax(token_raw, meta).await?;

        let Some(action) = ReadAction::parse(action_raw) else {
            return Err(self.reject_action(action_raw, meta).await);
        };

        let assistance = match action.scope() {
            Some(scope) => self.store.find_by_token(scope, token).await?,
            None => self.store.find_by_any_token(token).await?,
        };
        let Some(assistance) = assistance else {
            return Err(self.reject_token(meta).await);
        };

        self.audit
            .security_event(gateway_event(
                SecurityEventType::TokenAccessSuccess,
                Some(assistance.id.to_string()),
                &meta.client_ip,
                meta.user_agent.as_deref(),
                Some(format!("read:{}", action_raw)),
            ))
            .await;

        let (building, supplier) = self.store.display_names(&assistance).await?;
        Ok(SupplierAssistanceView {
            id: assistance.id,
            display_id: assistance.display_id,
            description: assistance.description,
            status: assistance.status,
            urgency: assistance.urgency,
            intervention_type: assistance.intervention_type,
            building,
            supplier,
            scheduled_datetime: assistance.scheduled_datetime,
        })
    }

    // =========================================================================
    //  CAMINHO DE ESCRITA (POST submit-supplier-action)
    // =========================================================================

    pub async fn submit(
        &self,
        action_raw: &str,
        token_raw: Option<&str>,
        data: Option<ActionData>,
        meta: &RequestMeta,
    ) -> Result<SubmitOutcome, AppError> {
        self.check_rate_limit(meta).await?;
        let token = self.check_token_syntax(token_raw, meta).await?;

        let Some(action) = SupplierAction::parse(action_raw) else {
            return Err(self.reject_action(action_raw, meta).await);
        };

        // Validações locais restantes antes de qualquer ida ao banco:
        // payload da ação e, no complete, a própria foto.
        let payload = ActionPayload::from_parts(action, data.as_ref())?;
        let photo_bytes = match (&payload, data.as_ref().and_then(|d| d.photo_base64.as_deref())) {
            (ActionPayload::Complete, Some(b64)) => Some(BASE64.decode(b64).map_err(|_| {
                AppError::InvalidActionPayload("Foto em base64 inválida.".to_string())
            })?),
            _ => None,
        };

        // Resolução: a coluna consultada é a do escopo da ação, e só ela.
        let Some(assistance) = self.store.find_by_token(action.scope(), token).await? else {
            return Err(self.reject_token(meta).await);
        };

        let transition = match transition::apply(assistance.status, &payload) {
            Ok(t) => t,
            Err(e) => {
                self.audit
                    .security_event(gateway_event(
                        SecurityEventType::InvalidTransition,
                        Some(assistance.id.to_string()),
                        &meta.client_ip,
                        meta.user_agent.as_deref(),
                        Some(format!("{} a partir de {}", action.as_str(), assistance.status)),
                    ))
                    .await;
                return Err(e);
            }
        };

        // Persistência: um único UPDATE condicional. Zero linhas = outra
        // invocação moveu o estado primeiro; devolvemos invalid_transition
        // em vez de sobrescrever às cegas.
        let applied = self
            .store
            .apply_transition(assistance.id, assistance.status, &transition)
            .await?;
        if !applied {
            self.audit
                .security_event(gateway_event(
                    SecurityEventType::UpdateConflict,
                    Some(assistance.id.to_string()),
                    &meta.client_ip,
                    meta.user_agent.as_deref(),
                    Some(format!("{} perdeu a corrida de estado", action.as_str())),
                ))
                .await;
            return Err(AppError::InvalidTransition {
                from: assistance.status,
                to: transition.new_status,
            });
        }

        self.audit
            .security_event(gateway_event(
                SecurityEventType::TokenAccessSuccess,
                Some(assistance.id.to_string()),
                &meta.client_ip,
                meta.user_agent.as_deref(),
                Some(format!(
                    "{}: {} → {}",
                    action.as_str(),
                    assistance.status,
                    transition.new_status
                )),
            ))
            .await;

        if let Some(bytes) = photo_bytes {
            self.store_completion_photo(&assistance, bytes).await?;
        }

        self.store
            .append_activity(
                assistance.id,
                &format!("Fornecedor: {}", messages::action_done("pt", action.as_str())),
                "Fornecedor",
                AuthorRole::Supplier,
            )
            .await?;

        // O e-mail é colaborador externo e opcional: falha vira log.
        if let Err(e) = self
            .notifier
            .send(&assistance, NotificationTemplate::SupplierActionNotice)
            .await
        {
            tracing::warn!(
                "Falha ao notificar ação '{}' da assistência #{}: {}",
                action.as_str(),
                assistance.display_id,
                e
            );
        }

        Ok(SubmitOutcome {
            message: messages::action_done(&meta.lang, action.as_str()),
        })
    }

    // =========================================================================
    //  ETAPAS PARTILHADAS
    // =========================================================================

    async fn check_rate_limit(&self, meta: &RequestMeta) -> Result<(), AppError> {
        if self.rate_limiter.check(&meta.client_ip) {
            return Ok(());
        }
        self.audit
            .security_event(gateway_event(
                SecurityEventType::RateLimitExceeded,
                None,
                &meta.client_ip,
                meta.user_agent.as_deref(),
                None,
            ))
            .await;
        Err(AppError::RateLimited)
    }

    async fn check_token_syntax<'t>(
        &self,
        token_raw: Option<&'t str>,
        meta: &RequestMeta,
    ) -> Result<&'t str, AppError> {
        match token::validate_syntax(token_raw) {
            Ok(token) => Ok(token),
            Err(e) => {
                let event_type = match e {
                    AppError::MissingToken => SecurityEventType::MissingToken,
                    _ => SecurityEventType::InvalidTokenFormat,
                };
                self.audit
                    .security_event(gateway_event(
                        event_type,
                        None,
                        &meta.client_ip,
                        meta.user_agent.as_deref(),
                        None,
                    ))
                    .await;
                Err(e)
            }
        }
    }

    async fn reject_action(&self, action_raw: &str, meta: &RequestMeta) -> AppError {
        self.audit
            .security_event(gateway_event(
                SecurityEventType::InvalidAction,
                None,
                &meta.client_ip,
                meta.user_agent.as_deref(),
                Some(action_raw.to_string()),
            ))
            .await;
        AppError::InvalidAction(action_raw.to_string())
    }

    async fn reject_token(&self, meta: &RequestMeta) -> AppError {
        self.audit
            .security_event(gateway_event(
                SecurityEventType::TokenNotFound,
                None,
                &meta.client_ip,
                meta.user_agent.as_deref(),
                None,
            ))
            .await;
        AppError::TokenNotFound(messages::token_not_found(&meta.lang))
    }

    async fn store_completion_photo(
        &self,
        assistance: &Assistance,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        let file_name = format!("assistencia-{}-{}.jpg", assistance.display_id, Uuid::new_v4());
        let blob = self.photos.store(&file_name, &bytes).await?;
        self.store
            .append_photo(
                assistance.id,
                &blob,
                PhotoCategory::Resultado,
                "Fornecedor",
                AuthorRole::Supplier,
                "image/jpeg",
                bytes.len() as i64,
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::models::assistance::{AssistanceStatus, UrgencyLevel};
    use crate::models::audit::NewAuditEvent;
    use crate::services::photo_storage::StoredBlob;
    use crate::services::store::AuditSink;
    use crate::services::token::TokenScope;
    use crate::services::transition::Transition;

    const GOOD_TOKEN: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn sample_assistance(status: AssistanceStatus) -> Assistance {
        Assistance {
            id: Uuid::new_v4(),
            display_id: 42,
            building_id: Uuid::new_v4(),
            supplier_id: None,
            intervention_type: "Canalização".into(),
            urgency: UrgencyLevel::Normal,
            description: "Fuga de água".into(),
            status,
            acceptance_token: GOOD_TOKEN.into(),
            scheduling_token: "b".repeat(48),
            validation_token: "c".repeat(48),
            scheduled_datetime: None,
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
    struct MockStore {
        assistance: Mutex<Option<Assistance>>,
        lookups: AtomicUsize,
        apply_calls: AtomicUsize,
        apply_ok: AtomicBool,
        applied: Mutex<Vec<(Uuid, AssistanceStatus, Transition)>>,
        activities: Mutex<Vec<String>>,
        photo_rows: AtomicUsize,
    }

    impl MockStore {
        fn with(assistance: Assistance) -> Self {
            let store = Self::default();
            *store.assistance.lock().unwrap() = Some(assistance);
            store.apply_ok.store(true, Ordering::SeqCst);
            store
        }
    }

    #[async_trait]
    impl AssistanceStore for MockStore {
        async fn find_by_token(
            &self,
            scope: TokenScope,
            token: &str,
        ) -> Result<Option<Assistance>, AppError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.assistance.lock().unwrap().clone().filter(|a| {
                let column = match scope {
                    TokenScope::Acceptance => &a.acceptance_token,
                    TokenScope::Scheduling => &a.scheduling_token,
                    TokenScope::Validation => &a.validation_token,
                };
                column == token
            }))
        }

        async fn find_by_any_token(&self, token: &str) -> Result<Option<Assistance>, AppError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.assistance.lock().unwrap().clone().filter(|a| {
                a.acceptance_token == token
                    || a.scheduling_token == token
                    || a.validation_token == token
            }))
        }

        async fn apply_transition(
            &self,
            id: Uuid,
            expected: AssistanceStatus,
            transition: &Transition,
        ) -> Result<bool, AppError> {
            self.apply_calls.fetch_add(1, Ordering::SeqCst);
            if !self.apply_ok.load(Ordering::SeqCst) {
                return Ok(false);
            }
            self.applied
                .lock()
                .unwrap()
                .push((id, expected, transition.clone()));
            Ok(true)
        }

        async fn find_scheduled_on(&self, _day: NaiveDate) -> Result<Vec<Assistance>, AppError> {
            Ok(vec![])
        }

        async fn mark_validation_reminder_sent(&self, _id: Uuid) -> Result<(), AppError> {
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
            self.photo_rows.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn append_activity(
            &self,
            _assistance_id: Uuid,
            message: &str,
            _author_name: &str,
            _author_role: AuthorRole,
        ) -> Result<(), AppError> {
            self.activities.lock().unwrap().push(message.to_string());
            Ok(())
        }

        async fn display_names(
            &self,
            _assistance: &Assistance,
        ) -> Result<(Option<String>, Option<String>), AppError> {
            Ok((Some("Edifício Aurora".into()), None))
        }
    }

    #[derive(Default)]
    struct MockAudit {
        events: Mutex<Vec<SecurityEventType>>,
    }

    #[async_trait]
    impl AuditSink for MockAudit {
        async fn record(&self, event: NewAuditEvent) -> Result<(), AppError> {
            self.events.lock().unwrap().push(event.event_type);
            Ok(())
        }
    }

    struct MockLimiter {
        allow: bool,
    }

    impl RateLimiter for MockLimiter {
        fn check(&self, _client_key: &str) -> bool {
            self.allow
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(
            &self,
            _assistance: &Assistance,
            _template: NotificationTemplate,
        ) -> Result<(), AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockPhotos {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PhotoStorage for MockPhotos {
        async fn store(&self, file_name: &str, _bytes: &[u8]) -> Result<StoredBlob, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(StoredBlob {
                storage_path: format!("/tmp/{file_name}"),
                public_url: format!("https://cdn.example.com/{file_name}"),
            })
        }
    }

    struct Harness {
        service: SupplierActionService,
        store: Arc<MockStore>,
        audit: Arc<MockAudit>,
        notifier: Arc<MockNotifier>,
        photos: Arc<MockPhotos>,
    }

    fn harness(store: MockStore, allow: bool) -> Harness {
        let store = Arc::new(store);
        let audit = Arc::new(MockAudit::default());
        let notifier = Arc::new(MockNotifier::default());
        let photos = Arc::new(MockPhotos::default());
        let service = SupplierActionService::new(
            store.clone(),
            AuditService::new(audit.clone()),
            Arc::new(MockLimiter { allow }),
            notifier.clone(),
            photos.clone(),
        );
        Harness { service, store, audit, notifier, photos }
    }

    fn meta() -> RequestMeta {
        RequestMeta {
            client_ip: "203.0.113.7".into(),
            user_agent: Some("teste-ua".into()),
            lang: "pt".into(),
        }
    }

    fn audited(h: &Harness) -> Vec<SecurityEventType> {
        h.audit.events.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn malformed_token_never_reaches_the_store() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::PendenteAceitacao)), true);

        let err = h.service.submit("accept", Some("curto"), None, &meta()).await;
        assert!(matches!(err, Err(AppError::InvalidTokenFormat)));
        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(audited(&h), vec![SecurityEventType::InvalidTokenFormat]);

        let err = h.service.submit("accept", None, None, &meta()).await;
        assert!(matches!(err, Err(AppError::MissingToken)));
        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rate_limit_short_circuits_before_any_lookup() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::PendenteAceitacao)), false);

        let err = h.service.submit("accept", Some(GOOD_TOKEN), None, &meta()).await;
        assert!(matches!(err, Err(AppError::RateLimited)));
        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(audited(&h), vec![SecurityEventType::RateLimitExceeded]);
    }

    #[tokio::test]
    async fn unknown_action_is_audited_and_rejected() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::PendenteAceitacao)), true);

        let err = h.service.submit("detonate", Some(GOOD_TOKEN), None, &meta()).await;
        assert!(matches!(err, Err(AppError::InvalidAction(_))));
        assert_eq!(h.store.lookups.load(Ordering::SeqCst), 0);
        assert_eq!(audited(&h), vec![SecurityEventType::InvalidAction]);
    }

    #[tokio::test]
    async fn unmatched_token_gets_generic_not_found() {
        let h = harness(MockStore::default(), true);

        let err = h.service.submit("accept", Some(GOOD_TOKEN), None, &meta()).await;
        match err {
            Err(AppError::TokenNotFound(msg)) => {
                assert_eq!(msg, "token inválido ou assistência não encontrada");
            }
            other => panic!("esperava TokenNotFound, veio {:?}", other.err()),
        }
        assert_eq!(audited(&h), vec![SecurityEventType::TokenNotFound]);
    }

    #[tokio::test]
    async fn scheduling_token_does_not_legitimize_accept() {
        let mut a = sample_assistance(AssistanceStatus::PendenteAceitacao);
        // accept procura na coluna acceptance_token; dar-lhe o token de
        // agendamento tem de falhar com o mesmo 404 genérico.
        a.acceptance_token = "z".repeat(48);
        let scheduling = a.scheduling_token.clone();
        let h = harness(MockStore::with(a), true);

        let err = h.service.submit("accept", Some(&scheduling), None, &meta()).await;
        assert!(matches!(err, Err(AppError::TokenNotFound(_))));
    }

    #[tokio::test]
    async fn accept_without_datetime_persists_pending_scheduling() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::PendenteRespostaInicial)), true);

        let outcome = h.service.submit("accept", Some(GOOD_TOKEN), None, &meta()).await.unwrap();
        assert_eq!(outcome.message, "Ação 'accept' realizada com sucesso.");

        let applied = h.store.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        let (_, expected_from, transition) = &applied[0];
        assert_eq!(*expected_from, AssistanceStatus::PendenteRespostaInicial);
        assert_eq!(transition.new_status, AssistanceStatus::PendenteAgendamento);

        assert!(audited(&h).contains(&SecurityEventType::TokenAccessSuccess));
        assert_eq!(h.notifier.calls.load(Ordering::SeqCst), 1);
        let activities = h.store.activities.lock().unwrap();
        assert_eq!(activities.len(), 1);
        assert!(activities[0].starts_with("Fornecedor:"));
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected_without_mutation() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::Concluido)), true);

        let err = h.service.submit("accept", Some(GOOD_TOKEN), None, &meta()).await;
        assert!(matches!(err, Err(AppError::InvalidTransition { .. })));
        assert_eq!(h.store.apply_calls.load(Ordering::SeqCst), 0);
        assert_eq!(audited(&h), vec![SecurityEventType::InvalidTransition]);
    }

    #[tokio::test]
    async fn lost_cas_race_is_a_conflict_not_a_success() {
        let store = MockStore::with(sample_assistance(AssistanceStatus::PendenteAceitacao));
        store.apply_ok.store(false, Ordering::SeqCst);
        let h = harness(store, true);

        let err = h.service.submit("accept", Some(GOOD_TOKEN), None, &meta()).await;
        assert!(matches!(err, Err(AppError::InvalidTransition { .. })));

        let events = audited(&h);
        assert!(events.contains(&SecurityEventType::UpdateConflict));
        assert!(!events.contains(&SecurityEventType::TokenAccessSuccess));
        assert!(h.store.activities.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_stores_photo_evidence_and_resets_counter() {
        let mut a = sample_assistance(AssistanceStatus::EmProgresso);
        a.validation_token = GOOD_TOKEN.into();
        let h = harness(MockStore::with(a), true);

        let data = ActionData {
            photo_base64: Some(BASE64.encode(b"jpegdata")),
            ..Default::default()
        };
        h.service.submit("complete", Some(GOOD_TOKEN), Some(data), &meta()).await.unwrap();

        let applied = h.store.applied.lock().unwrap();
        assert_eq!(applied[0].2.new_status, AssistanceStatus::PendenteValidacao);
        assert!(applied[0].2.reset_validation_reminders);
        assert_eq!(h.photos.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.store.photo_rows.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn view_is_idempotent_and_never_mutates() {
        let h = harness(MockStore::with(sample_assistance(AssistanceStatus::Agendado)), true);

        let first = h.service.fetch("view", Some(GOOD_TOKEN), &meta()).await.unwrap();
        let second = h.service.fetch("view", Some(GOOD_TOKEN), &meta()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.status, second.status);
        assert_eq!(first.building.as_deref(), Some("Edifício Aurora"));
        assert_eq!(h.store.apply_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn english_locale_localizes_portal_messages() {
        let h = harness(MockStore::default(), true);
        let mut m = meta();
        m.lang = "en".into();

        let err = h.service.submit("accept", Some(GOOD_TOKEN), None, &m).await;
        match err {
            Err(AppError::TokenNotFound(msg)) => {
                assert_eq!(msg, "invalid token or assistance not found");
            }
            other => panic!("esperava TokenNotFound, veio {:?}", other.err()),
        }
    }
}
