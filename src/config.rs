// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};

use crate::db::{
    AssistanceRepository, AuditRepository, BuildingRepository, CommunicationRepository,
    SupplierRepository,
};
use crate::services::{
    AssistanceService, AuditService, DocumentService, ReminderService, SupplierActionService,
    notification::HttpNotifier,
    photo_storage::{LocalPhotoStorage, PhotoStorage},
    rate_limit::InMemoryRateLimiter,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub cron_secret: Option<String>,

    pub supplier_actions: SupplierActionService,
    pub reminders: ReminderService,
    pub assistances: AssistanceService,
    pub documents: DocumentService,
    pub audit: AuditRepository,

    pub buildings: BuildingRepository,
    pub suppliers: SupplierRepository,
    pub communications: CommunicationRepository,
    pub photo_storage: Arc<dyn PhotoStorage>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let cron_secret = env::var("CRON_SECRET").ok();

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let assistance_repo = AssistanceRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let buildings = BuildingRepository::new(db_pool.clone());
        let suppliers = SupplierRepository::new(db_pool.clone());
        let communications = CommunicationRepository::new(db_pool.clone());

        let notifier = Arc::new(HttpNotifier::new(env::var("NOTIFICATION_SERVICE_URL").ok()));

        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let uploads_base = env::var("UPLOADS_PUBLIC_BASE")
            .unwrap_or_else(|_| "http://localhost:3000/uploads".to_string());
        let photo_storage: Arc<dyn PhotoStorage> =
            Arc::new(LocalPhotoStorage::new(uploads_dir, uploads_base));

        let portal_base_url =
            env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let fonts_dir = env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string());

        let audit = AuditService::new(Arc::new(audit_repo.clone()));
        let supplier_actions = SupplierActionService::new(
            Arc::new(assistance_repo.clone()),
            audit,
            Arc::new(InMemoryRateLimiter::from_env()),
            notifier.clone(),
            photo_storage.clone(),
        );
        let reminders = ReminderService::new(Arc::new(assistance_repo.clone()), notifier.clone());
        let assistances = AssistanceService::new(assistance_repo.clone(), notifier);
        let documents = DocumentService::new(assistance_repo, portal_base_url, fonts_dir);

        Ok(Self {
            db_pool,
            jwt_secret,
            cron_secret,
            supplier_actions,
            reminders,
            assistances,
            documents,
            audit: audit_repo,
            buildings,
            suppliers,
            communications,
            photo_storage,
        })
    }
}
