//! Display order for scored events
//!
//! Key: risk (HIGH, MEDIUM, LOW, unlabeled), then hype descending, then
//! days-to-event ascending with unknown dates last. The sort is stable, so
//! full ties keep their input order.

use std::cmp::Ordering;

use crate::model::EventRecord;

fn risk_rank(event: &EventRecord) -> u8 {
    event.risk.map(|r| r.priority()).unwrap_or(3)
}

fn by_hype_desc(a: &EventRecord, b: &EventRecord) -> Ordering {
    let ha = a.hype_index.unwrap_or(f64::NEG_INFINITY);
    let hb = b.hype_index.unwrap_or(f64::NEG_INFINITY);
    hb.total_cmp(&ha)
}

fn by_days_asc(a: &EventRecord, b: &EventRecord) -> Ordering {
    match (a.days_to_event, b.days_to_event) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ordering used by [`rank`]
pub fn compare(a: &EventRecord, b: &EventRecord) -> Ordering {
    risk_rank(a)
        .cmp(&risk_rank(b))
        .then_with(|| by_hype_desc(a, b))
        .then_with(|| by_days_asc(a, b))
}

/// Sort events into display order
pub fn rank(mut events: Vec<EventRecord>) -> Vec<EventRecord> {
    events.sort_by(compare);
    events
}
