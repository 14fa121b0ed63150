//! Gaps between consecutive entries.

use crate::models::Entry;
use crate::utils::time::{hours_between, round_hours};

/// Set `gap` on each live entry to the hours elapsed since the previous live
/// entry ended, in array order.
///
/// The first entry has no gap, and neither has an entry whose predecessor is
/// still open. Deleted entries get no gap and do not count as predecessors.
pub fn apply_gaps(entries: &mut [Entry]) {
    let mut previous_end = None;
    let mut first = true;

    for entry in entries.iter_mut() {
        if entry.deleted {
            entry.gap = None;
            continue;
        }

        entry.gap = if first {
            None
        } else {
            previous_end.map(|end| round_hours(hours_between(&end, &entry.start)))
        };

        first = false;
        previous_end = entry.end;
    }
}
