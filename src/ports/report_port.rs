//! Report generation port trait.

use crate::domain::dashboard::AnalysisReport;
use crate::domain::error::PortlensError;

/// Port for writing analysis reports.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), PortlensError>;
}
