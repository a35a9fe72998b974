//! Keyword classification of free-text event labels.
//!
//! Matching is a case-insensitive substring search against the profile's
//! keyword tables. Only end-of-event labels are classified: the duration
//! column is meaningful only once an event has finished.
use crate::profile::VendorProfile;
use crate::types::{EventKind, Phase};

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| {
        let k = k.trim().to_lowercase();
        !k.is_empty() && haystack.contains(&k)
    })
}

pub fn detect_phase(event: &str, profile: &VendorProfile) -> Option<Phase> {
    let lower = event.to_lowercase();
    profile
        .phase_keywords
        .iter()
        .find(|p| contains_any(&lower, &p.keywords))
        .map(|p| p.phase)
}

pub fn is_end_of_event(event: &str, profile: &VendorProfile) -> bool {
    contains_any(&event.to_lowercase(), &profile.end_markers)
}

pub fn detect_kind(event: &str, profile: &VendorProfile) -> Option<EventKind> {
    let lower = event.to_lowercase();
    profile
        .kind_keywords
        .iter()
        .find(|k| contains_any(&lower, &k.keywords))
        .map(|k| k.kind)
}

/// Phase and kind of a completed voltage-deviation event, or `None` for
/// anything else (start-of-event rows, other phase events, unrelated labels).
pub fn classify(event: &str, profile: &VendorProfile) -> Option<(Phase, EventKind)> {
    let phase = detect_phase(event, profile)?;
    if !is_end_of_event(event, profile) {
        return None;
    }
    let kind = detect_kind(event, profile)?;
    Some((phase, kind))
}
