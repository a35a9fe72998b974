//! One analysis run: row source in, result object out.
use crate::error::AnalysisError;
use crate::loader::{collect_events, LoadReport};
use crate::profile::VendorProfile;
use crate::reports::aggregate;
use crate::source::RowSource;
use crate::summary::{details, summary_text};
use crate::types::{AnalysisResult, ReportGroup};

/// Everything a run produced, before it is reduced to the result object.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub groups: Vec<ReportGroup>,
    pub load: LoadReport,
    pub result: AnalysisResult,
}

pub fn run(source: &mut dyn RowSource, profile: &VendorProfile) -> Result<Analysis, AnalysisError> {
    let rows = source.read_rows()?;
    let (events, load) = collect_events(&rows, profile, source.banner_extent())?;
    let groups = aggregate(&events, profile);
    log::debug!(
        "{}: skipped {} short rows, {} row errors, {} unclassified; rejected {} short, {} sentinel, {} inside threshold",
        profile.name,
        load.short_rows,
        load.row_errors,
        load.unclassified,
        load.short_duration,
        load.sentinel_voltage,
        load.inside_threshold
    );
    log::info!(
        "{}: {} rows, data from row {}, {} events kept, {} reportable groups",
        profile.name,
        load.total_rows,
        load.data_start,
        load.kept,
        groups.len()
    );
    let result = AnalysisResult {
        success: true,
        summary: Some(summary_text(&groups, load.kept, profile)),
        has_errors: !groups.is_empty(),
        details: Some(details(&groups)),
        error: None,
    };
    Ok(Analysis { groups, load, result })
}

/// The single failure result reported for a fatal error.
pub fn failure(e: &AnalysisError, profile: &VendorProfile) -> AnalysisResult {
    log::error!("{}: analysis failed: {}", profile.name, e);
    AnalysisResult::failure(format!("Ошибка анализа: {}", e))
}
