//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod email_log_repo;
pub mod emr_repo;
pub mod execution_repo;
pub mod inference_repo;
pub mod scan_repo;
pub mod workflow_repo;

pub use email_log_repo::EmailLogRepo;
pub use emr_repo::EmrRepo;
pub use execution_repo::ExecutionRepo;
pub use inference_repo::InferenceRepo;
pub use scan_repo::ScanRepo;
pub use workflow_repo::WorkflowRepo;
