use crate::error::Rejection;
use crate::profile::VendorProfile;
use crate::types::{CanonicalEvent, EventKind, NormalizedRow, Phase};

/// Apply the inclusion rules in order; the first failing rule wins.
///
/// 1. duration strictly above the profile minimum;
/// 2. voltage is neither the "no reading" sentinel nor zero;
/// 3. when the profile has hard thresholds, the voltage lies beyond the one
///    matching the event kind.
pub fn admit(
    phase: Phase,
    kind: EventKind,
    month: u32,
    row: &NormalizedRow,
    profile: &VendorProfile,
) -> Result<CanonicalEvent, Rejection> {
    if row.duration <= profile.min_duration || row.duration.is_nan() {
        return Err(Rejection::ShortDuration);
    }
    if (row.voltage - profile.sentinel_voltage).abs() < profile.sentinel_tolerance || row.voltage == 0.0 {
        return Err(Rejection::SentinelVoltage);
    }
    if let Some(t) = profile.thresholds {
        let beyond = match kind {
            EventKind::Undervoltage => row.voltage < t.lower,
            EventKind::Overvoltage => row.voltage > t.upper,
        };
        if !beyond {
            return Err(Rejection::InsideThreshold);
        }
    }
    Ok(CanonicalEvent { phase, kind, voltage: row.voltage, month, duration: row.duration })
}
