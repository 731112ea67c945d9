//! Configuration validation.
//!
//! Checks the `[service]` and `[report]` sections before any request is
//! sent. Missing keys fall back to their defaults and are not errors.

use crate::domain::error::PortlensError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ENDPOINT: &str = "/api/analyze";
pub const DEFAULT_AXIS_TICKS: i64 = 6;
pub const AXIS_TICKS_RANGE: std::ops::RangeInclusive<i64> = 2..=20;

pub fn validate_service_config(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    validate_base_url(config)?;
    validate_endpoint(config)?;
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    validate_output(config)?;
    validate_axis_ticks(config)?;
    Ok(())
}

fn validate_base_url(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    let Some(url) = config.get_string("service", "base_url") else {
        return Ok(());
    };
    let url = url.trim();
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        Some(_) => Err(PortlensError::ConfigInvalid {
            section: "service".to_string(),
            key: "base_url".to_string(),
            reason: "base_url has no host".to_string(),
        }),
        None => Err(PortlensError::ConfigInvalid {
            section: "service".to_string(),
            key: "base_url".to_string(),
            reason: "base_url must start with http:// or https://".to_string(),
        }),
    }
}

fn validate_endpoint(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    match config.get_string("service", "endpoint") {
        Some(path) if !path.trim().starts_with('/') => Err(PortlensError::ConfigInvalid {
            section: "service".to_string(),
            key: "endpoint".to_string(),
            reason: "endpoint must be an absolute path such as /api/analyze".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    match config.get_string("report", "output") {
        Some(path) if path.trim().is_empty() => Err(PortlensError::ConfigInvalid {
            section: "report".to_string(),
            key: "output".to_string(),
            reason: "output path is empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_axis_ticks(config: &dyn ConfigPort) -> Result<(), PortlensError> {
    let Some(raw) = config
        .get_string("report", "axis_ticks")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(());
    };
    let Ok(value) = raw.parse::<i64>() else {
        return Err(PortlensError::ConfigInvalid {
            section: "report".to_string(),
            key: "axis_ticks".to_string(),
            reason: format!("axis_ticks {raw:?} is not an integer"),
        });
    };
    if !AXIS_TICKS_RANGE.contains(&value) {
        return Err(PortlensError::ConfigInvalid {
            section: "report".to_string(),
            key: "axis_ticks".to_string(),
            reason: format!(
                "axis_ticks must be between {} and {}",
                AXIS_TICKS_RANGE.start(),
                AXIS_TICKS_RANGE.end()
            ),
        });
    }
    Ok(())
}
