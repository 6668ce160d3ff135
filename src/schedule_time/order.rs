//! Ordering and grouping of schedule-time records.

use super::types::ScheduleTime;
use std::cmp::Ordering;

/// Compares two records for display order.
///
/// Day sets compare element-wise ascending, so a set that is a prefix of a
/// longer one sorts first. Ties break on start time (lexicographic is safe
/// because times are zero-padded), then end time, then id, which makes the
/// order total: distinct records never compare equal.
pub fn compare(a: &ScheduleTime, b: &ScheduleTime) -> Ordering {
    a.days_array
        .cmp(&b.days_array)
        .then_with(|| a.start_time.cmp(&b.start_time))
        .then_with(|| a.end_time.cmp(&b.end_time))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sorts records into canonical display order.
pub fn sort_records(records: &mut [ScheduleTime]) {
    records.sort_by(compare);
}

/// Partitions records by exact `day_group_name` equality for the grouped
/// table view. Groups appear in canonical day order; within a group records
/// are ordered by start time.
pub fn group_by_day_label(mut records: Vec<ScheduleTime>) -> Vec<(String, Vec<ScheduleTime>)> {
    records.sort_by(compare);

    let mut groups: Vec<(String, Vec<ScheduleTime>)> = Vec::new();
    for record in records {
        match groups
            .iter_mut()
            .find(|(label, _)| *label == record.day_group_name)
        {
            Some((_, members)) => members.push(record),
            None => groups.push((record.day_group_name.clone(), vec![record])),
        }
    }

    groups
}
