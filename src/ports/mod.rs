//! Port traits at the edges of the domain.

pub mod analytics_port;
pub mod config_port;
pub mod holdings_port;
pub mod report_port;
