use crate::records::Record;

/// Distance tolerance within which near-tied hits compete for the pick.
/// Matches the hit-test's distance units, not screen pixels.
pub const PICK_TOLERANCE: f32 = 2.0;

/// One candidate from the caller's geometric hit-test: an index into the
/// current filtered subset plus a proximity score (lower = closer).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub record_index: usize,
    pub distance: f32,
}

/// Resolves an ambiguous hit-test to a single record. Among candidates within
/// [`PICK_TOLERANCE`] of the closest hit, a featured record wins; otherwise
/// the closest hit does. Featured records render larger, so they should take
/// overlapping taps.
pub fn resolve<'a>(candidates: &[Hit], records: &'a [Record]) -> Option<&'a Record> {
    resolve_with_tolerance(candidates, records, PICK_TOLERANCE)
}

pub fn resolve_with_tolerance<'a>(
    candidates: &[Hit],
    records: &'a [Record],
    tolerance: f32,
) -> Option<&'a Record> {
    let mut sorted: Vec<Hit> = candidates
        .iter()
        .copied()
        .filter(|hit| hit.record_index < records.len())
        .collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let close_threshold = sorted[0].distance + tolerance;
    let featured = sorted
        .iter()
        .take_while(|hit| hit.distance <= close_threshold)
        .find(|hit| records[hit.record_index].is_featured());

    let winner = featured.unwrap_or(&sorted[0]);
    Some(&records[winner.record_index])
}
