use crate::profile::VendorProfile;
use crate::types::{CanonicalEvent, EventKind, Phase, ReportGroup};
use crate::util::month_range;
use std::collections::BTreeMap;

/// Group events by (kind, phase) and keep the groups worth reporting.
///
/// A group is reportable when it holds strictly more events than the
/// profile's minimum count. Output order is overvoltage A, B, C followed by
/// undervoltage A, B, C. Months carry no year, so a range is computed over
/// month numbers only.
pub fn aggregate(events: &[CanonicalEvent], profile: &VendorProfile) -> Vec<ReportGroup> {
    #[derive(Default)]
    struct Acc {
        voltages: Vec<f64>,
        months: Vec<u32>,
    }

    let mut map: BTreeMap<(EventKind, Phase), Acc> = BTreeMap::new();
    for e in events {
        let acc = map.entry((e.kind, e.phase)).or_default();
        acc.voltages.push(e.voltage);
        acc.months.push(e.month);
    }

    let nominal = profile.nominal_voltage;
    map.into_iter()
        .filter(|(_, acc)| acc.voltages.len() > profile.min_group_count)
        .filter_map(|((kind, phase), acc)| {
            let first_month = acc.months.iter().copied().min()?;
            let last_month = acc.months.iter().copied().max()?;
            let min_voltage = acc.voltages.iter().copied().fold(f64::INFINITY, f64::min);
            let max_voltage = acc.voltages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let deviation = match kind {
                EventKind::Overvoltage => (
                    (min_voltage - nominal) / nominal * 100.0,
                    (max_voltage - nominal) / nominal * 100.0,
                ),
                EventKind::Undervoltage => (
                    (nominal - max_voltage) / nominal * 100.0,
                    (nominal - min_voltage) / nominal * 100.0,
                ),
            };
            Some(ReportGroup {
                kind,
                phase,
                count: acc.voltages.len(),
                min_voltage,
                max_voltage,
                period: month_range(first_month, last_month),
                deviation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, phase: Phase, voltage: f64, month: u32) -> CanonicalEvent {
        CanonicalEvent { phase, kind, voltage, month, duration: 120.0 }
    }

    fn many(kind: EventKind, phase: Phase, n: usize, voltage: f64, month: u32) -> Vec<CanonicalEvent> {
        (0..n).map(|_| ev(kind, phase, voltage, month)).collect()
    }

    #[test]
    fn ten_events_are_not_reportable_eleven_are() {
        let p = VendorProfile::rim();
        let mut events = many(EventKind::Undervoltage, Phase::A, 10, 190.0, 8);
        assert!(aggregate(&events, &p).is_empty());
        events.push(ev(EventKind::Undervoltage, Phase::A, 190.0, 8));
        let groups = aggregate(&events, &p);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 11);
    }

    #[test]
    fn undervoltage_reports_minimum_and_deviation() {
        let p = VendorProfile::rim();
        let mut events = many(EventKind::Undervoltage, Phase::B, 11, 198.0, 3);
        events.push(ev(EventKind::Undervoltage, Phase::B, 176.0, 5));
        let g = &aggregate(&events, &p)[0];
        assert_eq!(g.extremal_voltage(), 176.0);
        assert_eq!(g.period, "Мар-Май");
        assert!((g.deviation.0 - 10.0).abs() < 1e-9);
        assert!((g.deviation.1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn overvoltage_reports_maximum_and_deviation() {
        let p = VendorProfile::rim();
        let mut events = many(EventKind::Overvoltage, Phase::C, 11, 231.0, 7);
        events.push(ev(EventKind::Overvoltage, Phase::C, 264.0, 7));
        let g = &aggregate(&events, &p)[0];
        assert_eq!(g.extremal_voltage(), 264.0);
        assert_eq!(g.period, "Июл");
        assert!((g.deviation.0 - 5.0).abs() < 1e-9);
        assert!((g.deviation.1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn groups_come_out_in_report_order() {
        let p = VendorProfile::rim();
        let mut events = Vec::new();
        events.extend(many(EventKind::Undervoltage, Phase::A, 11, 190.0, 1));
        events.extend(many(EventKind::Overvoltage, Phase::C, 11, 250.0, 1));
        events.extend(many(EventKind::Overvoltage, Phase::A, 11, 250.0, 1));
        events.extend(many(EventKind::Overvoltage, Phase::B, 3, 250.0, 1));
        let keys: Vec<_> = aggregate(&events, &p).iter().map(|g| (g.kind, g.phase)).collect();
        assert_eq!(
            keys,
            vec![
                (EventKind::Overvoltage, Phase::A),
                (EventKind::Overvoltage, Phase::C),
                (EventKind::Undervoltage, Phase::A),
            ]
        );
    }

    #[test]
    fn december_and_january_collapse_to_month_numbers() {
        let p = VendorProfile::rim();
        let mut events = many(EventKind::Undervoltage, Phase::A, 6, 190.0, 12);
        events.extend(many(EventKind::Undervoltage, Phase::A, 6, 190.0, 1));
        assert_eq!(aggregate(&events, &p)[0].period, "Янв-Дек");
    }
}
