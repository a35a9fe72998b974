use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tabled::Tabled;

/// A single raw cell as handed over by a row source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text form of the cell, or `None` when the cell carries nothing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.as_text().is_some()
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

pub type RawRow = Vec<Cell>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    pub fn letter(self) -> char {
        match self {
            Phase::A => 'A',
            Phase::B => 'B',
            Phase::C => 'C',
        }
    }

    /// Key used in the structured details mapping.
    pub fn key(self) -> String {
        format!("phase_{}", self.letter())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

// Variant order drives report order: overvoltage groups come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Overvoltage,
    Undervoltage,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Overvoltage => "overvoltage",
            EventKind::Undervoltage => "undervoltage",
        }
    }
}

/// Canonical fields pulled out of one raw row, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub timestamp: String,
    pub event: String,
    pub voltage: f64,
    pub percent: Option<f64>,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalEvent {
    pub phase: Phase,
    pub kind: EventKind,
    pub voltage: f64,
    pub month: u32,
    pub duration: f64,
}

/// A (kind, phase) bucket that crossed the reportability threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportGroup {
    pub kind: EventKind,
    pub phase: Phase,
    pub count: usize,
    pub min_voltage: f64,
    pub max_voltage: f64,
    pub period: String,
    /// Percent deviation from nominal, low end first.
    pub deviation: (f64, f64),
}

impl ReportGroup {
    /// Max voltage for overvoltage groups, min voltage for undervoltage groups.
    pub fn extremal_voltage(&self) -> f64 {
        match self.kind {
            EventKind::Overvoltage => self.max_voltage,
            EventKind::Undervoltage => self.min_voltage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extremal {
    Max(f64),
    Min(f64),
}

#[cfg(test)]
impl Extremal {
    pub fn value(self) -> f64 {
        match self {
            Extremal::Max(v) | Extremal::Min(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailEntry {
    pub count: usize,
    #[serde(flatten)]
    pub extremal: Extremal,
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Details {
    pub overvoltage: BTreeMap<String, DetailEntry>,
    pub undervoltage: BTreeMap<String, DetailEntry>,
}

impl Details {
    #[cfg(test)]
    pub fn get(&self, kind: EventKind, phase: Phase) -> Option<&DetailEntry> {
        match kind {
            EventKind::Overvoltage => self.overvoltage.get(&phase.key()),
            EventKind::Undervoltage => self.undervoltage.get(&phase.key()),
        }
    }

    pub fn len(&self) -> usize {
        self.overvoltage.len() + self.undervoltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub has_errors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn failure(message: impl Into<String>) -> Self {
        AnalysisResult {
            success: false,
            summary: None,
            has_errors: false,
            details: None,
            error: Some(message.into()),
        }
    }
}

/// Flat table row for console previews and CSV export.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupRow {
    #[serde(rename = "File")]
    #[tabled(rename = "File")]
    pub file: String,
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Phase")]
    #[tabled(rename = "Phase")]
    pub phase: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "ExtremalVoltage")]
    #[tabled(rename = "ExtremalVoltage")]
    pub extremal_voltage: String,
    #[serde(rename = "Deviation")]
    #[tabled(rename = "Deviation")]
    pub deviation: String,
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
}

impl GroupRow {
    pub fn new(file: &str, g: &ReportGroup) -> Self {
        GroupRow {
            file: file.to_string(),
            kind: g.kind.as_str().to_string(),
            phase: g.phase.to_string(),
            count: g.count,
            extremal_voltage: format!("{:.2}", g.extremal_voltage()),
            deviation: format!("{:.1}-{:.1}%", g.deviation.0, g.deviation.1),
            period: g.period.clone(),
        }
    }
}
