use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized aggregate progress for the whole store.
///
/// There is exactly one of these per store, maintained incrementally by the
/// engine on every add/delete/mark-learned call. Counters are `i64` to match
/// SQLite's integer width; the delete path can drive `learned_words` below
/// zero (the original behavior, kept intentionally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub total_words: i64,
    pub learned_words: i64,
    pub streak_days: i64,
    pub last_active: Option<DateTime<Utc>>,
}

impl ProgressSummary {
    /// Share of entries that are learned, as a percentage.
    ///
    /// Returns 0 when the store is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percentage(&self) -> f64 {
        if self.total_words == 0 {
            0.0
        } else {
            self.learned_words as f64 / self.total_words as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(total: i64, learned: i64) -> ProgressSummary {
        ProgressSummary {
            total_words: total,
            learned_words: learned,
            ..ProgressSummary::default()
        }
    }

    #[test]
    fn percentage_is_zero_for_empty_store() {
        assert_eq!(summary(0, 0).progress_percentage(), 0.0);
    }

    #[test]
    fn percentage_half_learned() {
        assert_eq!(summary(10, 5).progress_percentage(), 50.0);
    }

    #[test]
    fn percentage_all_learned() {
        assert_eq!(summary(10, 10).progress_percentage(), 100.0);
    }

    #[test]
    fn percentage_one_third() {
        let pct = summary(3, 1).progress_percentage();
        assert!((pct - 33.333).abs() < 0.001);
    }
}
