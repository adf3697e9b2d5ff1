//! Shared primitives for the Carelink platform.
//!
//! Kept deliberately small: id/timestamp aliases and the domain error enum.
//! Everything else lives in the crate that owns the concern.

pub mod error;
pub mod types;
