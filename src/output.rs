use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the rows, or `(no rows)` when there is nothing to show.
pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupRow;

    fn sample() -> GroupRow {
        GroupRow {
            file: "meter.tsv".to_string(),
            kind: "undervoltage".to_string(),
            phase: "A".to_string(),
            count: 15,
            extremal_voltage: "190.00".to_string(),
            deviation: "13.6-13.6%".to_string(),
            period: "Авг".to_string(),
        }
    }

    #[test]
    fn empty_table_renders_placeholder() {
        assert_eq!(render_table::<GroupRow>(&[]), "(no rows)");
    }

    #[test]
    fn table_has_markdown_header() {
        let table = render_table(&[sample()]);
        assert!(table.contains("| File"));
        assert!(table.contains("undervoltage"));
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let path = std::env::temp_dir().join(format!("voltage_report_{}_groups.csv", std::process::id()));
        write_csv(&path, &[sample()]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("File,Kind,Phase,Count,ExtremalVoltage,Deviation,Period"));
        assert_eq!(lines.next(), Some("meter.tsv,undervoltage,A,15,190.00,13.6-13.6%,Авг"));
    }
}
