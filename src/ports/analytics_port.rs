//! Analytics service port trait.

use serde_json::Value;

use crate::domain::error::PortlensError;
use crate::domain::session::AnalyzeRequest;

/// Submits a weighted portfolio to the analytics service.
///
/// Implementations return the decoded response body untouched; it is only
/// trusted after [`validate`](crate::domain::validation::validate).
pub trait AnalyticsPort {
    fn analyze(&self, request: &AnalyzeRequest) -> Result<Value, PortlensError>;
}
