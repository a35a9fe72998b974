//! Human-readable summary line and the structured details mapping.
//!
//! The details mapping is the machine-readable contract; the summary text is
//! for display and may change wording freely.
use crate::profile::{SummaryStyle, VendorProfile};
use crate::types::{DetailEntry, Details, EventKind, Extremal, ReportGroup};

pub const WITHIN_STANDARD: &str = "Напряжение в пределах ГОСТ";

fn line(group: &ReportGroup, style: SummaryStyle) -> String {
    let (lo, hi) = group.deviation;
    let v = group.extremal_voltage();
    match (style, group.kind) {
        (SummaryStyle::Deviation, EventKind::Overvoltage) => format!(
            "Фаза {}: Перенапряжение {:.1}-{:.1}% (max {:.0}В) ({}) - {} событий",
            group.phase, lo, hi, v, group.period, group.count
        ),
        (SummaryStyle::Deviation, EventKind::Undervoltage) => format!(
            "Фаза {}: Провал {:.1}-{:.1}% (min {:.0}В) ({}) - {} событий",
            group.phase, lo, hi, v, group.period, group.count
        ),
        (SummaryStyle::Compact, EventKind::Overvoltage) => format!(
            "{} U{}>10% – {} шт, Umax={:.2}",
            group.period,
            group.phase.letter().to_ascii_lowercase(),
            group.count,
            v
        ),
        (SummaryStyle::Compact, EventKind::Undervoltage) => format!(
            "{} U{}<10% – {} шт, Umin={:.2}",
            group.period,
            group.phase.letter().to_ascii_lowercase(),
            group.count,
            v
        ),
    }
}

/// Summary text for a run. `surviving` is the number of events that passed
/// filtering, used only by profiles that note sub-threshold activity.
pub fn summary_text(groups: &[ReportGroup], surviving: usize, profile: &VendorProfile) -> String {
    if groups.is_empty() {
        if profile.note_subthreshold && surviving > 0 {
            return format!(
                "Обнаружено событий: {}, но все менее {} по каждому типу",
                surviving, profile.min_group_count
            );
        }
        return WITHIN_STANDARD.to_string();
    }
    groups
        .iter()
        .map(|g| line(g, profile.summary_style))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn details(groups: &[ReportGroup]) -> Details {
    let mut out = Details::default();
    for g in groups {
        let entry = DetailEntry {
            count: g.count,
            extremal: match g.kind {
                EventKind::Overvoltage => Extremal::Max(g.max_voltage),
                EventKind::Undervoltage => Extremal::Min(g.min_voltage),
            },
            period: g.period.clone(),
        };
        match g.kind {
            EventKind::Overvoltage => out.overvoltage.insert(g.phase.key(), entry),
            EventKind::Undervoltage => out.undervoltage.insert(g.phase.key(), entry),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    fn group(kind: EventKind, phase: Phase) -> ReportGroup {
        ReportGroup {
            kind,
            phase,
            count: 12,
            min_voltage: 176.0,
            max_voltage: 198.0,
            period: "Мар-Май".to_string(),
            deviation: (10.0, 20.0),
        }
    }

    #[test]
    fn empty_report_is_within_standard() {
        assert_eq!(summary_text(&[], 0, &VendorProfile::rim()), WITHIN_STANDARD);
        assert_eq!(summary_text(&[], 7, &VendorProfile::rim()), WITHIN_STANDARD);
        assert!(details(&[]).overvoltage.is_empty());
    }

    #[test]
    fn subthreshold_note_when_enabled() {
        let mut p = VendorProfile::rim();
        p.note_subthreshold = true;
        assert_eq!(summary_text(&[], 7, &p), "Обнаружено событий: 7, но все менее 10 по каждому типу");
        assert_eq!(summary_text(&[], 0, &p), WITHIN_STANDARD);
    }

    #[test]
    fn deviation_lines_are_joined() {
        let groups = vec![group(EventKind::Overvoltage, Phase::A), group(EventKind::Undervoltage, Phase::B)];
        assert_eq!(
            summary_text(&groups, 24, &VendorProfile::rim()),
            "Фаза A: Перенапряжение 10.0-20.0% (max 198В) (Мар-Май) - 12 событий; \
             Фаза B: Провал 10.0-20.0% (min 176В) (Мар-Май) - 12 событий"
        );
    }

    #[test]
    fn compact_lines() {
        let groups = vec![group(EventKind::Undervoltage, Phase::C)];
        assert_eq!(
            summary_text(&groups, 12, &VendorProfile::rim_tsv()),
            "Мар-Май Uc<10% – 12 шт, Umin=176.00"
        );
    }

    #[test]
    fn details_serialize_with_max_or_min_key() {
        let d = details(&[group(EventKind::Overvoltage, Phase::A), group(EventKind::Undervoltage, Phase::C)]);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "overvoltage": {"phase_A": {"count": 12, "max": 198.0, "period": "Мар-Май"}},
                "undervoltage": {"phase_C": {"count": 12, "min": 176.0, "period": "Мар-Май"}}
            })
        );
        assert_eq!(d.get(EventKind::Undervoltage, Phase::C).map(|e| e.extremal.value()), Some(176.0));
    }
}
