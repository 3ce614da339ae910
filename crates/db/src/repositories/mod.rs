//! Repository structs, one per table.
//!
//! Each repository is a zero-sized struct with async associated functions
//! taking a `&PgPool` and returning `sqlx::Error` on failure.

pub mod conversion_repo;
pub mod lab_controller_repo;
pub mod playbook_repo;
pub mod run_repo;
pub mod virtual_service_repo;

pub use conversion_repo::ConversionRepo;
pub use lab_controller_repo::LabControllerRepo;
pub use playbook_repo::PlaybookRepo;
pub use run_repo::RunRepo;
pub use virtual_service_repo::VirtualServiceRepo;
