pub mod assistance_repo;
pub use assistance_repo::AssistanceRepository;
pub mod building_repo;
pub use building_repo::BuildingRepository;
pub mod supplier_repo;
pub use supplier_repo::SupplierRepository;
pub mod communication_repo;
pub use communication_repo::CommunicationRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
