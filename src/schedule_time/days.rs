//! Weekday label codec for day-group names.
//!
//! Weekday indices run 0=lunes through 6=domingo. A day-group name is the
//! dash-joined list of short labels for a set of days, e.g. `"Lu-Mi-Vi"`.

/// Short Spanish labels indexed by weekday (0=Monday .. 6=Sunday).
pub const DAY_LABELS: [&str; 7] = ["Lu", "Ma", "Mi", "Ju", "Vi", "Sá", "Do"];

/// Returns the short label for a weekday index, or `None` if out of range.
pub fn day_label(index: u8) -> Option<&'static str> {
    DAY_LABELS.get(index as usize).copied()
}

/// Returns the weekday index for a short label, or `None` if unrecognized.
pub fn day_index(label: &str) -> Option<u8> {
    DAY_LABELS.iter().position(|l| *l == label).map(|i| i as u8)
}

/// Canonicalizes a day set: ascending order, deduplicated, out-of-range dropped.
pub fn canonical_days(days: &[u8]) -> Vec<u8> {
    let mut sorted: Vec<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Encodes a set of weekday indices into a day-group name.
///
/// Input order does not matter; the result is always in ascending day order.
/// A single day encodes to its bare label with no dash.
pub fn encode_days(days: &[u8]) -> String {
    canonical_days(days)
        .iter()
        .filter_map(|d| day_label(*d))
        .collect::<Vec<_>>()
        .join("-")
}

/// Decodes a day-group name back into weekday indices.
///
/// Every dash-separated part names one specific day: `"Lu-Vi"` significa lunes
/// y viernes, no lunes a viernes. Treating a two-part name as an inclusive
/// range would silently change which days a schedule applies to.
///
/// Unrecognized parts are dropped, so callers must tolerate a partial result.
pub fn decode_days(name: &str) -> Vec<u8> {
    name.split('-').filter_map(day_index).collect()
}
