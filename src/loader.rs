use crate::classify::classify;
use crate::error::{AnalysisError, Rejection, RowError};
use crate::filter::admit;
use crate::locator::locate_data_start;
use crate::profile::VendorProfile;
use crate::types::{CanonicalEvent, Cell, NormalizedRow, RawRow};
use crate::util::{parse_f64_safe, parse_month};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub data_start: usize,
    pub short_rows: usize,
    pub row_errors: usize,
    pub unclassified: usize,
    pub short_duration: usize,
    pub sentinel_voltage: usize,
    pub inside_threshold: usize,
    pub kept: usize,
}

impl LoadReport {
    fn reject(&mut self, why: Rejection) {
        match why {
            Rejection::ShortDuration => self.short_duration += 1,
            Rejection::SentinelVoltage => self.sentinel_voltage += 1,
            Rejection::InsideThreshold => self.inside_threshold += 1,
        }
    }
}

fn cell_text(row: &RawRow, column: usize) -> Option<String> {
    row.get(column).and_then(Cell::as_text)
}

fn cell_number(row: &RawRow, column: usize, strip_units: bool) -> Result<f64, RowError> {
    match row.get(column) {
        Some(Cell::Number(n)) if n.is_finite() => Ok(*n),
        Some(cell) => {
            let text = cell.as_text().ok_or(RowError::MissingField(column))?;
            parse_f64_safe(Some(&text), strip_units)
                .ok_or(RowError::NotNumeric { column, value: text })
        }
        None => Err(RowError::MissingField(column)),
    }
}

/// Pull the canonical fields out of one raw row.
///
/// `Ok(None)` means the row does not have enough populated cells to be a
/// record at all (trailing blank rows, footers) and is skipped quietly.
pub fn normalize_row(
    row: &RawRow,
    profile: &VendorProfile,
) -> Result<Option<NormalizedRow>, RowError> {
    let cols = &profile.columns;
    let populated = row.iter().filter(|c| c.is_populated()).count();
    if row.len() < cols.required() || populated < 2 {
        return Ok(None);
    }

    let timestamp = cell_text(row, cols.timestamp).ok_or(RowError::MissingField(cols.timestamp))?;
    let event = cell_text(row, cols.event).ok_or(RowError::MissingField(cols.event))?;
    let voltage = cell_number(row, cols.voltage, profile.strip_units)? / profile.voltage_divisor;
    let duration = cell_number(row, cols.duration, profile.strip_units)?;
    let percent = cols
        .percent
        .and_then(|c| cell_number(row, c, profile.strip_units).ok());

    Ok(Some(NormalizedRow { timestamp, event, voltage, percent, duration }))
}

/// Run every data row through normalize, classify and filter.
///
/// Row-level problems are counted in the returned report and never abort
/// the run; only failing to find the data region does.
pub fn collect_events(
    rows: &[RawRow],
    profile: &VendorProfile,
    banner_extent: Option<usize>,
) -> Result<(Vec<CanonicalEvent>, LoadReport), AnalysisError> {
    if rows.is_empty() {
        return Err(AnalysisError::Format("row source produced no rows".to_string()));
    }
    let data_start = locate_data_start(rows, profile, banner_extent)?;
    let mut report = LoadReport { total_rows: rows.len(), data_start, ..LoadReport::default() };
    let mut events = Vec::new();

    for (idx, row) in rows.iter().enumerate().skip(data_start) {
        let normalized = match normalize_row(row, profile) {
            Ok(Some(n)) => n,
            Ok(None) => {
                report.short_rows += 1;
                continue;
            }
            Err(e) => {
                log::trace!("Row {}: {}", idx, e);
                report.row_errors += 1;
                continue;
            }
        };

        let Some((phase, kind)) = classify(&normalized.event, profile) else {
            log::trace!("Row {}: unclassified event {:?}", idx, normalized.event);
            report.unclassified += 1;
            continue;
        };

        let Some(month) = parse_month(&normalized.timestamp) else {
            log::trace!("Row {}: {}", idx, RowError::BadTimestamp(normalized.timestamp.clone()));
            report.row_errors += 1;
            continue;
        };

        match admit(phase, kind, month, &normalized, profile) {
            Ok(event) => {
                log::trace!(
                    "Row {}: {} {} {:.2} V for {} s (deviation {:?} %)",
                    idx,
                    kind.as_str(),
                    phase,
                    event.voltage,
                    event.duration,
                    normalized.percent
                );
                events.push(event);
            }
            Err(why) => {
                log::trace!("Row {}: rejected ({:?})", idx, why);
                report.reject(why);
            }
        }
    }

    report.kept = events.len();
    Ok((events, report))
}
