use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the daily activity report.
///
/// `added` counts entries created on `date`; `learned` counts entries created
/// on `date` whose *current* difficulty is at the learned threshold or above.
/// It does not track when the learn action itself happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub added: i64,
    pub learned: i64,
}
