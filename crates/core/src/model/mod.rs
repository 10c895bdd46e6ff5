mod entry;
mod ids;
mod language;
mod progress;
mod stats;

pub use entry::{
    Difficulty, DifficultyError, EntryDraft, EntryError, ValidatedEntry, VocabularyEntry,
};
pub use ids::EntryId;
pub use language::{Language, ParseLanguageError, SUPPORTED_LANGUAGES};
pub use progress::ProgressSummary;
pub use stats::DailyStat;
