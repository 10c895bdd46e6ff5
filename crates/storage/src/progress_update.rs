//! Incremental transitions for the singleton progress record.
//!
//! Both backends route every mutation through these functions so the counter
//! and streak semantics cannot drift between SQLite and the in-memory store.

use chrono::{DateTime, Utc};
use vocab_core::model::ProgressSummary;

/// Applies the effect of inserting one entry.
pub(crate) fn apply_added(summary: &mut ProgressSummary) {
    summary.total_words += 1;
}

/// Applies the effect of deleting one entry.
///
/// The learned decrement is based on the deleted row's difficulty at the time
/// of deletion and has no floor at zero. Deleting learned entries when
/// `learned_words` is already 0 drives the counter negative; that matches the
/// original bookkeeping and is kept as-is.
pub(crate) fn apply_deleted(summary: &mut ProgressSummary, was_learned: bool) {
    summary.total_words -= 1;
    if was_learned {
        summary.learned_words -= 1;
    }
}

/// Applies the effect of marking one entry learned at `now`.
///
/// `learned_words` is incremented unconditionally; marking an already-learned
/// entry again double-counts. Kept for compatibility with the original.
///
/// The streak policy compares `now` with the *previous* `last_active` by
/// calendar date (UTC):
/// - no previous activity: streak unchanged
/// - exactly one day since: streak + 1
/// - more than one day since: streak reset to 1
/// - same day: streak unchanged, repeated learns do not inflate it
pub(crate) fn apply_learned(summary: &mut ProgressSummary, now: DateTime<Utc>) {
    let previous_active = summary.last_active;

    summary.learned_words += 1;
    summary.last_active = Some(now);

    if let Some(previous) = previous_active {
        let gap_days = (now.date_naive() - previous.date_naive()).num_days();
        if gap_days == 1 {
            summary.streak_days += 1;
        } else if gap_days > 1 {
            summary.streak_days = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vocab_core::time::fixed_now;

    #[test]
    fn add_and_delete_track_totals() {
        let mut summary = ProgressSummary::default();
        apply_added(&mut summary);
        apply_added(&mut summary);
        assert_eq!(summary.total_words, 2);

        apply_deleted(&mut summary, false);
        assert_eq!(summary.total_words, 1);
        assert_eq!(summary.learned_words, 0);
    }

    #[test]
    fn deleting_learned_entry_has_no_floor() {
        let mut summary = ProgressSummary {
            total_words: 1,
            ..ProgressSummary::default()
        };
        apply_deleted(&mut summary, true);
        assert_eq!(summary.learned_words, -1);
    }

    #[test]
    fn first_learn_leaves_streak_unchanged() {
        let mut summary = ProgressSummary::default();
        apply_learned(&mut summary, fixed_now());
        assert_eq!(summary.streak_days, 0);
        assert_eq!(summary.learned_words, 1);
        assert_eq!(summary.last_active, Some(fixed_now()));
    }

    #[test]
    fn next_day_learn_extends_streak() {
        let mut summary = ProgressSummary::default();
        apply_learned(&mut summary, fixed_now());
        apply_learned(&mut summary, fixed_now() + Duration::days(1));
        assert_eq!(summary.streak_days, 1);
        apply_learned(&mut summary, fixed_now() + Duration::days(2));
        assert_eq!(summary.streak_days, 2);
    }

    #[test]
    fn gap_resets_streak_to_one() {
        let mut summary = ProgressSummary::default();
        apply_learned(&mut summary, fixed_now());
        apply_learned(&mut summary, fixed_now() + Duration::days(1));
        apply_learned(&mut summary, fixed_now() + Duration::days(2));
        assert_eq!(summary.streak_days, 2);

        apply_learned(&mut summary, fixed_now() + Duration::days(5));
        assert_eq!(summary.streak_days, 1);
    }

    #[test]
    fn same_day_learn_does_not_inflate_streak() {
        let mut summary = ProgressSummary::default();
        apply_learned(&mut summary, fixed_now());
        apply_learned(&mut summary, fixed_now() + Duration::days(1));
        assert_eq!(summary.streak_days, 1);

        apply_learned(&mut summary, fixed_now() + Duration::days(1) + Duration::hours(3));
        assert_eq!(summary.streak_days, 1);
        // double-count on learned_words is intentional
        assert_eq!(summary.learned_words, 3);
    }

    #[test]
    fn calendar_days_not_elapsed_hours_drive_the_streak() {
        // 23:00 one day to 01:00 the next is two hours apart but one
        // calendar day, so the streak still extends.
        let late = fixed_now()
            .date_naive()
            .and_hms_opt(23, 0, 0)
            .unwrap()
            .and_utc();
        let early_next = late + Duration::hours(2);

        let mut summary = ProgressSummary::default();
        apply_learned(&mut summary, late);
        apply_learned(&mut summary, early_next);
        assert_eq!(summary.streak_days, 1);
    }
}
