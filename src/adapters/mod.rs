//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod http_analytics_adapter;
pub mod typst_report;
