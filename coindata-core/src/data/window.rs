//! Fetch-window splitting.

use chrono::{DateTime, Duration, Utc};

/// Split `[start, end)` into consecutive sub-windows of at most `max_span`.
///
/// Windows abut exactly: each window's end is the next window's start, so the
/// union covers the full range with no gap and no overlap. Returns an empty
/// Vec when `start >= end`.
pub fn split_windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    max_span: Duration,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut windows = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let window_end = std::cmp::min(cursor + max_span, end);
        windows.push((cursor, window_end));
        cursor = window_end;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn single_window_when_span_fits() {
        let windows = split_windows(day(1), day(5), Duration::days(7));
        assert_eq!(windows, vec![(day(1), day(5))]);
    }

    #[test]
    fn splits_exact_multiple() {
        let windows = split_windows(day(1), day(15), Duration::days(7));
        assert_eq!(windows, vec![(day(1), day(8)), (day(8), day(15))]);
    }

    #[test]
    fn last_window_carries_remainder() {
        let windows = split_windows(day(1), day(18), Duration::days(7));
        assert_eq!(
            windows,
            vec![(day(1), day(8)), (day(8), day(15)), (day(15), day(18))]
        );
    }

    #[test]
    fn windows_abut_without_gaps() {
        let windows = split_windows(day(1), day(31), Duration::days(7));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        assert_eq!(windows.first().unwrap().0, day(1));
        assert_eq!(windows.last().unwrap().1, day(31));
    }

    #[test]
    fn empty_when_start_not_before_end() {
        assert!(split_windows(day(5), day(5), Duration::days(7)).is_empty());
        assert!(split_windows(day(6), day(5), Duration::days(7)).is_empty());
    }
}
