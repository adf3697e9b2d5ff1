//! External AI services.
//!
//! Two independent clients: [`inference::InferenceClient`] classifies a
//! single scan (external service with a local mock fallback), and
//! [`insight::InsightClient`] produces a narrative summary of a patient's
//! scan history via a generative text model.

pub mod inference;
pub mod insight;
