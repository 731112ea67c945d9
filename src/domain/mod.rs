//! Core domain types and logic.

pub mod holding;
pub mod metrics;
pub mod validation;
pub mod spectral;
pub mod chart_data;
pub mod session;
pub mod dashboard;
pub mod config_validation;
pub mod error;
