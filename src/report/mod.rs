//! Survey report rendering

pub mod formatter;

pub use formatter::{format_available, format_current, format_preferred, format_report};

use crate::core::types::SurveyReport;

/// Render the report as pretty-printed JSON
pub fn to_json(report: &SurveyReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
