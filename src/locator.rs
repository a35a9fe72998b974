//! Finding where the tabular data starts inside a loosely laid out export.
use crate::error::AnalysisError;
use crate::profile::VendorProfile;
use crate::types::RawRow;
use crate::util::is_strict_date;

/// Zero-based index of the first data row.
///
/// Scanning starts after the profile's fixed leading rows, or after the merged
/// banner when the source reports one, whichever is further down. Within the
/// scan window a banner row is skipped, a header row means data starts on the
/// next row, and a row starting with a `DD.MM.YYYY` date is itself the first
/// data row.
pub fn locate_data_start(
    rows: &[RawRow],
    profile: &VendorProfile,
    banner_extent: Option<usize>,
) -> Result<usize, AnalysisError> {
    let start = profile.leading_rows.max(banner_extent.unwrap_or(0));
    let end = start.saturating_add(profile.scan_window).min(rows.len());
    let banners = lowercase_all(&profile.banner_markers);
    let headers = lowercase_all(&profile.header_keywords);

    for idx in start..end {
        let Some(first) = rows[idx].first().and_then(|c| c.as_text()) else {
            continue;
        };
        let lower = first.to_lowercase();
        if banners.iter().any(|b| lower.contains(b.as_str())) {
            log::trace!("Row {}: banner, skipping", idx);
            continue;
        }
        if headers.iter().any(|h| lower.contains(h.as_str())) {
            log::debug!("Row {}: header row, data starts at {}", idx, idx + 1);
            return Ok(idx + 1);
        }
        if is_strict_date(&first) {
            log::debug!("Row {}: first dated row, no header", idx);
            return Ok(idx);
        }
    }
    Err(AnalysisError::Format("could not locate data start".to_string()))
}

fn lowercase_all(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn row(cells: &[&str]) -> RawRow {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn rim() -> VendorProfile {
        VendorProfile::rim()
    }

    #[test]
    fn header_row_means_next_row() {
        let rows = vec![
            row(&["Журнал событий напряжения"]),
            row(&["Время", "Событие", "Напряжение, В"]),
            row(&["01.08.2025 10:00:00", "Фаза A провал окончание"]),
        ];
        assert_eq!(locate_data_start(&rows, &rim(), None).unwrap(), 2);
    }

    #[test]
    fn dated_first_row_starts_immediately() {
        let rows = vec![row(&["01.08.2025 10:00:00", "x"]), row(&["02.08.2025", "y"])];
        assert_eq!(locate_data_start(&rows, &rim(), None).unwrap(), 0);
    }

    #[test]
    fn banner_containing_header_word_is_still_a_banner() {
        let mut profile = rim();
        profile.banner_markers = vec!["журнал".to_string()];
        let rows = vec![
            row(&["Журнал: время работы"]),
            row(&["05.03.2025 01:00", "x"]),
        ];
        assert_eq!(locate_data_start(&rows, &profile, None).unwrap(), 1);
    }

    #[test]
    fn leading_rows_are_never_scanned() {
        let mut rows: Vec<RawRow> = (0..15).map(|i| row(&[format!("шапка {}", i).as_str()])).collect();
        rows[3] = row(&["01.01.2025"]);
        rows.push(row(&["Дата/время", "Событие"]));
        rows.push(row(&["08.08.2025 07:34:16", "Фаза А окончание провала"]));
        assert_eq!(locate_data_start(&rows, &VendorProfile::energomera(), None).unwrap(), 16);
    }

    #[test]
    fn merged_banner_pushes_the_scan_start() {
        let rows = vec![
            row(&["Журнал"]),
            row(&[""]),
            row(&["01.01.2025 junk"]),
            row(&["Время", "Событие журнала напряжений"]),
            row(&["01.08.2025 10:00:00", "фаза A"]),
        ];
        let nartis = VendorProfile::nartis();
        assert_eq!(locate_data_start(&rows, &nartis, Some(3)).unwrap(), 4);
        // Without merge information the fixed offset of one row applies.
        assert_eq!(locate_data_start(&rows, &nartis, None).unwrap(), 4);
    }

    #[test]
    fn nothing_recognisable_is_a_format_error() {
        let rows: Vec<RawRow> = (0..20).map(|_| row(&["мусор", "ещё"])).collect();
        let err = locate_data_start(&rows, &rim(), None).unwrap_err();
        assert_eq!(err.to_string(), "could not locate data start");
    }

    #[test]
    fn header_outside_scan_window_is_not_found() {
        let mut rows: Vec<RawRow> = (0..12).map(|_| row(&["мусор"])).collect();
        rows.push(row(&["Время"]));
        assert!(locate_data_start(&rows, &rim(), None).is_err());
    }
}
