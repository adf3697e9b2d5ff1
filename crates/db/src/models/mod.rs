//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where the HTTP layer needs one

pub mod email_log;
pub mod emr;
pub mod execution;
pub mod inference;
pub mod scan;
pub mod workflow;
