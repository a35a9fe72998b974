//! Vendor profiles: everything that differs between meter brands' exports.
//!
//! A profile is plain data. The built-in ones cover the supported meter
//! families; anything else can be described in a TOML file with the same
//! field names (missing keys fall back to [`VendorProfile::default`]).
use crate::error::ProfileError;
use crate::types::{EventKind, Phase};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    /// `Фаза A: Перенапряжение 5.0-9.1% (max 240В) (Авг) - 12 событий`
    #[default]
    Deviation,
    /// `Авг Ua>10% – 12 шт, Umax=240.00`
    Compact,
}

/// Zero-based column positions of the canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Columns {
    pub timestamp: usize,
    pub event: usize,
    pub voltage: usize,
    #[serde(default)]
    pub percent: Option<usize>,
    pub duration: usize,
}

impl Columns {
    /// Number of populated cells a row needs before it is worth normalizing.
    pub fn required(&self) -> usize {
        [self.timestamp, self.event, self.voltage, self.duration]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns { timestamp: 0, event: 1, voltage: 2, percent: Some(3), duration: 4 }
    }
}

/// Fixed voltage boundaries checked on top of the label-derived kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    /// Undervoltage events must be strictly below this.
    pub lower: f64,
    /// Overvoltage events must be strictly above this.
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhaseKeywords {
    pub phase: Phase,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KindKeywords {
    pub kind: EventKind,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VendorProfile {
    pub name: String,
    pub columns: Columns,
    /// Raw voltage readings are divided by this (10 for deci-volt exports).
    pub voltage_divisor: f64,
    /// Drop unit suffixes such as `В` or `с` from numeric cells.
    pub strip_units: bool,
    /// Rows always skipped before the data-region scan starts.
    pub leading_rows: usize,
    pub scan_window: usize,
    pub banner_markers: Vec<String>,
    pub header_keywords: Vec<String>,
    pub phase_keywords: Vec<PhaseKeywords>,
    pub end_markers: Vec<String>,
    /// Checked in order; the first kind with a matching keyword wins.
    pub kind_keywords: Vec<KindKeywords>,
    /// Documented "no reading" marker.
    pub sentinel_voltage: f64,
    pub sentinel_tolerance: f64,
    /// Events must last strictly longer than this many seconds.
    pub min_duration: f64,
    pub thresholds: Option<Thresholds>,
    pub nominal_voltage: f64,
    /// Groups need strictly more events than this to be reported.
    pub min_group_count: usize,
    pub summary_style: SummaryStyle,
    /// Mention the surviving event total when nothing is reportable.
    pub note_subthreshold: bool,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// "фаза a" style keywords for every phase, with both the Latin letter and
/// its Cyrillic look-alike since exports mix the two.
fn phase_table(prefixes: &[&str]) -> Vec<PhaseKeywords> {
    let letters = [(Phase::A, ['a', 'а']), (Phase::B, ['b', 'в']), (Phase::C, ['c', 'с'])];
    letters
        .iter()
        .map(|(phase, variants)| PhaseKeywords {
            phase: *phase,
            keywords: prefixes
                .iter()
                .flat_map(|p| variants.iter().map(move |v| format!("{} {}", p, v)))
                .collect(),
        })
        .collect()
}

fn kind_table(under: &[&str], over: &[&str]) -> Vec<KindKeywords> {
    vec![
        KindKeywords { kind: EventKind::Undervoltage, keywords: words(under) },
        KindKeywords { kind: EventKind::Overvoltage, keywords: words(over) },
    ]
}

impl Default for VendorProfile {
    fn default() -> Self {
        VendorProfile {
            name: "custom".to_string(),
            columns: Columns::default(),
            voltage_divisor: 1.0,
            strip_units: false,
            leading_rows: 0,
            scan_window: 10,
            banner_markers: words(&["журнал событий"]),
            header_keywords: words(&["время"]),
            phase_keywords: phase_table(&["фаза"]),
            end_markers: words(&["окончание"]),
            kind_keywords: kind_table(&["провал"], &["перенапряжение"]),
            sentinel_voltage: 11.50,
            sentinel_tolerance: 1e-3,
            min_duration: 60.0,
            thresholds: None,
            nominal_voltage: 220.0,
            min_group_count: 10,
            summary_style: SummaryStyle::Deviation,
            note_subthreshold: false,
        }
    }
}

impl VendorProfile {
    pub const BUILTIN: [&'static str; 4] = ["energomera", "nartis", "rim", "rim-tsv"];

    pub fn by_name(name: &str) -> Result<Self, ProfileError> {
        match name.to_lowercase().as_str() {
            "energomera" => Ok(Self::energomera()),
            "nartis" => Ok(Self::nartis()),
            "rim" => Ok(Self::rim()),
            "rim-tsv" => Ok(Self::rim_tsv()),
            other => Err(ProfileError::Unknown(other.to_string())),
        }
    }

    /// Energomera: 15 banner rows, then a `Дата/время | Событие | ...` header.
    pub fn energomera() -> Self {
        VendorProfile {
            name: "energomera".to_string(),
            columns: Columns { timestamp: 0, event: 1, voltage: 4, percent: Some(5), duration: 6 },
            leading_rows: 15,
            header_keywords: words(&["дата/время", "время"]),
            ..Self::default()
        }
    }

    /// Nartis: deci-volt readings, a merged title row and hard 198/242 V limits.
    pub fn nartis() -> Self {
        VendorProfile {
            name: "nartis".to_string(),
            voltage_divisor: 10.0,
            leading_rows: 1,
            kind_keywords: kind_table(&["провал"], &["перенапряжени"]),
            thresholds: Some(Thresholds { lower: 198.0, upper: 242.0 }),
            ..Self::default()
        }
    }

    pub fn rim() -> Self {
        VendorProfile {
            name: "rim".to_string(),
            strip_units: true,
            phase_keywords: phase_table(&["фаза", "phase"]),
            end_markers: words(&["окончание", "конец"]),
            kind_keywords: kind_table(&["провал", "понижен"], &["перенапряжение", "повышен"]),
            ..Self::default()
        }
    }

    /// RIM tab-separated text export with the short summary wording.
    pub fn rim_tsv() -> Self {
        VendorProfile {
            name: "rim-tsv".to_string(),
            leading_rows: 2,
            summary_style: SummaryStyle::Compact,
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ProfileError> {
        let profile: VendorProfile = toml::from_str(s)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(self.voltage_divisor.is_finite() && self.voltage_divisor > 0.0) {
            return Err(ProfileError::Invalid(format!(
                "voltage_divisor must be positive, got {}",
                self.voltage_divisor
            )));
        }
        if self.scan_window == 0 {
            return Err(ProfileError::Invalid("scan_window must be at least 1".to_string()));
        }
        for phase in Phase::ALL {
            let covered = self
                .phase_keywords
                .iter()
                .any(|p| p.phase == phase && p.keywords.iter().any(|k| !k.trim().is_empty()));
            if !covered {
                return Err(ProfileError::Invalid(format!("no keywords for phase {}", phase)));
            }
        }
        for kind in [EventKind::Overvoltage, EventKind::Undervoltage] {
            let covered = self
                .kind_keywords
                .iter()
                .any(|k| k.kind == kind && k.keywords.iter().any(|w| !w.trim().is_empty()));
            if !covered {
                return Err(ProfileError::Invalid(format!("no keywords for {}", kind.as_str())));
            }
        }
        if self.end_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ProfileError::Invalid("no end-of-event markers".to_string()));
        }
        Ok(())
    }
}

pub fn load_profile(path: &Path) -> Result<VendorProfile, ProfileError> {
    let s = std::fs::read_to_string(path)?;
    let profile = VendorProfile::from_toml_str(&s)?;
    log::info!("Loaded vendor profile {:?} from {}", profile.name, path.display());
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        for name in VendorProfile::BUILTIN {
            let p = VendorProfile::by_name(name).unwrap();
            assert!(p.validate().is_ok(), "{} failed validation", name);
        }
    }

    #[test]
    fn unknown_profile_name_is_rejected() {
        assert!(matches!(VendorProfile::by_name("landis"), Err(ProfileError::Unknown(_))));
    }

    #[test]
    fn only_nartis_carries_hard_thresholds() {
        assert!(VendorProfile::nartis().thresholds.is_some());
        assert!(VendorProfile::energomera().thresholds.is_none());
        assert!(VendorProfile::rim().thresholds.is_none());
    }

    #[test]
    fn columns_required_counts_highest_index() {
        assert_eq!(VendorProfile::energomera().columns.required(), 7);
        assert_eq!(Columns::default().required(), 5);
    }

    #[test]
    fn toml_profile_fills_defaults() {
        let p = VendorProfile::from_toml_str(
            r#"
            name = "sigma"
            voltage_divisor = 10.0
            leading_rows = 3

            [columns]
            timestamp = 1
            event = 2
            voltage = 3
            duration = 5

            [thresholds]
            lower = 200.0
            upper = 240.0
            "#,
        )
        .unwrap();
        assert_eq!(p.name, "sigma");
        assert_eq!(p.columns.timestamp, 1);
        assert_eq!(p.columns.percent, None);
        assert_eq!(p.voltage_divisor, 10.0);
        assert_eq!(p.min_group_count, 10);
        assert_eq!(p.thresholds, Some(Thresholds { lower: 200.0, upper: 240.0 }));
        assert_eq!(p.phase_keywords.len(), 3);
    }

    #[test]
    fn toml_profile_with_keyword_tables() {
        let p = VendorProfile::from_toml_str(
            r#"
            end_markers = ["end"]
            summary_style = "compact"

            [[phase_keywords]]
            phase = "A"
            keywords = ["l1"]
            [[phase_keywords]]
            phase = "B"
            keywords = ["l2"]
            [[phase_keywords]]
            phase = "C"
            keywords = ["l3"]

            [[kind_keywords]]
            kind = "undervoltage"
            keywords = ["dip"]
            [[kind_keywords]]
            kind = "overvoltage"
            keywords = ["swell"]
            "#,
        )
        .unwrap();
        assert_eq!(p.summary_style, SummaryStyle::Compact);
        assert_eq!(p.kind_keywords[1].keywords, vec!["swell".to_string()]);
    }

    #[test]
    fn zero_divisor_is_invalid() {
        let err = VendorProfile::from_toml_str("voltage_divisor = 0.0").unwrap_err();
        assert!(matches!(err, ProfileError::Invalid(_)));
    }

    #[test]
    fn missing_phase_keywords_is_invalid() {
        let err = VendorProfile::from_toml_str(
            r#"
            [[phase_keywords]]
            phase = "A"
            keywords = ["l1"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ProfileError::Invalid(_)));
    }
}
