pub mod assistance_service;
pub use assistance_service::AssistanceService;
pub mod audit;
pub use audit::AuditService;
pub mod document_service;
pub use document_service::DocumentService;
pub mod gateway;
pub use gateway::SupplierActionService;
pub mod notification;
pub mod photo_storage;
pub mod rate_limit;
pub mod reminder;
pub use reminder::ReminderService;
pub mod store;
pub mod token;
pub mod transition;
