// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Portal do Fornecedor (público) ---
        handlers::supplier::supplier_route,
        handlers::supplier::submit_supplier_action,

        // --- Jobs ---
        handlers::jobs::process_reminders,

        // --- Assistências ---
        handlers::assistances::create_assistance,
        handlers::assistances::list_assistances,
        handlers::assistances::get_assistance,
        handlers::assistances::change_status,
        handlers::assistances::resend_acceptance_request,
        handlers::assistances::service_order_pdf,

        // --- Comunicações e Fotos ---
        handlers::communications::create_communication,
        handlers::communications::list_communications,
        handlers::communications::upload_photo,
        handlers::communications::list_photos,

        // --- Edifícios ---
        handlers::buildings::create_building,
        handlers::buildings::list_buildings,
        handlers::buildings::update_building,
        handlers::buildings::deactivate_building,

        // --- Fornecedores ---
        handlers::suppliers::create_supplier,
        handlers::suppliers::list_suppliers,
        handlers::suppliers::update_supplier,
        handlers::suppliers::deactivate_supplier,

        // --- Auditoria ---
        handlers::audit::list_audit_events,
    ),
    components(
        schemas(
            // --- Assistências ---
            models::assistance::AssistanceStatus,
            models::assistance::UrgencyLevel,
            models::assistance::Assistance,
            models::assistance::SupplierAssistanceView,

            // --- Comunicações ---
            models::communication::AuthorRole,
            models::communication::PhotoCategory,
            models::communication::Communication,
            models::communication::Photo,

            // --- Referências ---
            models::building::Building,
            models::supplier::Supplier,

            // --- Auditoria ---
            models::audit::AuditEvent,

            // --- Jobs ---
            services::reminder::ReminderSummary,

            // --- Payloads ---
            handlers::supplier::SubmitSupplierActionPayload,
            services::transition::ActionData,
            handlers::assistances::CreateAssistancePayload,
            handlers::assistances::ChangeStatusPayload,
            handlers::communications::CreateCommunicationPayload,
            handlers::communications::UploadPhotoPayload,
            handlers::buildings::CreateBuildingPayload,
            handlers::buildings::UpdateBuildingPayload,
            handlers::suppliers::CreateSupplierPayload,
            handlers::suppliers::UpdateSupplierPayload,
        )
    ),
    tags(
        (name = "Portal do Fornecedor", description = "Acesso anónimo por token de capacidade"),
        (name = "Assistências", description = "Gestão dos pedidos de assistência"),
        (name = "Comunicações", description = "Thread de mensagens e fotos por assistência"),
        (name = "Edifícios", description = "Cadastro de edifícios"),
        (name = "Fornecedores", description = "Cadastro de fornecedores"),
        (name = "Jobs", description = "Tarefas periódicas disparadas externamente"),
        (name = "Auditoria", description = "Trilha de eventos de segurança")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
