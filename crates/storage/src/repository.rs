use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use vocab_core::model::{
    DailyStat, EntryId, Language, ProgressSummary, ValidatedEntry, VocabularyEntry,
};

use crate::progress_update;

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("entry '{word}' already exists for language '{language}'")]
    Duplicate { word: String, language: Language },

    #[error("no entry with id {0}")]
    NotFound(EntryId),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The persistence & statistics engine contract.
///
/// Every mutating operation is atomic: either the entry change and the
/// progress-record update both land, or neither does. Implementations take
/// the current time from the caller so behavior stays deterministic in tests.
#[async_trait]
pub trait VocabRepository: Send + Sync {
    /// Insert a validated entry and bump `total_words`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Duplicate` if an entry with the same
    /// (word, language) pair exists, or other storage errors.
    async fn add_entry(&self, entry: &ValidatedEntry) -> Result<EntryId, StorageError>;

    /// Every entry, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn all_entries(&self) -> Result<Vec<VocabularyEntry>, StorageError>;

    /// Remove an entry and decrement the counters it contributed to.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id does not exist.
    async fn delete_entry(&self, id: EntryId) -> Result<(), StorageError>;

    /// Force the entry to the learned rating, stamp its review time, and
    /// update learned count, streak, and last-active in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id does not exist.
    async fn mark_learned(&self, id: EntryId, now: DateTime<Utc>) -> Result<(), StorageError>;

    /// Read the singleton progress record. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn progress(&self) -> Result<ProgressSummary, StorageError>;

    /// Entries for one language, hardest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn entries_by_language(
        &self,
        language: Language,
    ) -> Result<Vec<VocabularyEntry>, StorageError>;

    /// Per-day add/learned counts for entries created in the trailing
    /// `window_days` days, ascending by date. Days without entries are
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    async fn daily_stats(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyStat>, StorageError>;
}

/// Midnight UTC of the oldest calendar day inside the stats window.
pub(crate) fn stats_cutoff(today: NaiveDate, window_days: u32) -> DateTime<Utc> {
    (today - Duration::days(i64::from(window_days)))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

#[derive(Default)]
struct InMemoryState {
    next_id: u64,
    entries: BTreeMap<EntryId, VocabularyEntry>,
    progress: ProgressSummary,
}

/// Simple in-memory engine implementation for testing and prototyping.
///
/// Mirrors the SQLite engine's observable semantics, including the
/// deliberately preserved double-count and underflow quirks.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl VocabRepository for InMemoryStore {
    async fn add_entry(&self, entry: &ValidatedEntry) -> Result<EntryId, StorageError> {
        let mut state = self.lock()?;
        if state
            .entries
            .values()
            .any(|e| e.word == entry.word && e.language == entry.language)
        {
            return Err(StorageError::Duplicate {
                word: entry.word.clone(),
                language: entry.language,
            });
        }

        state.next_id += 1;
        let id = EntryId::new(state.next_id);
        state.entries.insert(id, entry.clone().assign_id(id));
        progress_update::apply_added(&mut state.progress);
        Ok(id)
    }

    async fn all_entries(&self) -> Result<Vec<VocabularyEntry>, StorageError> {
        let state = self.lock()?;
        let mut entries: Vec<_> = state.entries.values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let removed = state.entries.remove(&id).ok_or(StorageError::NotFound(id))?;
        progress_update::apply_deleted(&mut state.progress, removed.is_learned());
        Ok(())
    }

    async fn mark_learned(&self, id: EntryId, now: DateTime<Utc>) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        {
            let entry = state
                .entries
                .get_mut(&id)
                .ok_or(StorageError::NotFound(id))?;
            entry.difficulty = vocab_core::model::Difficulty::LEARNED;
            entry.last_reviewed = Some(now);
        }
        progress_update::apply_learned(&mut state.progress, now);
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressSummary, StorageError> {
        Ok(self.lock()?.progress)
    }

    async fn entries_by_language(
        &self,
        language: Language,
    ) -> Result<Vec<VocabularyEntry>, StorageError> {
        let state = self.lock()?;
        let mut entries: Vec<_> = state
            .entries
            .values()
            .filter(|e| e.language == language)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
        Ok(entries)
    }

    async fn daily_stats(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyStat>, StorageError> {
        let cutoff = stats_cutoff(today, window_days);
        let state = self.lock()?;

        let mut by_date: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
        for entry in state.entries.values() {
            if entry.created_at < cutoff {
                continue;
            }
            let slot = by_date.entry(entry.created_at.date_naive()).or_default();
            slot.0 += 1;
            if entry.is_learned() {
                slot.1 += 1;
            }
        }

        Ok(by_date
            .into_iter()
            .map(|(date, (added, learned))| DailyStat {
                date,
                added,
                learned,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_core::model::EntryDraft;
    use vocab_core::time::fixed_now;

    fn draft(word: &str, language: Language, difficulty: i64) -> ValidatedEntry {
        EntryDraft {
            word: word.into(),
            translation: format!("{word} (tr)"),
            language,
            difficulty,
        }
        .validate(fixed_now())
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_word_same_language_is_rejected() {
        let store = InMemoryStore::new();
        store
            .add_entry(&draft("Hallo", Language::German, 1))
            .await
            .unwrap();

        let err = store
            .add_entry(&draft("Hallo", Language::German, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate { .. }));

        // same word under a different language is fine
        store
            .add_entry(&draft("Hallo", Language::English, 1))
            .await
            .unwrap();
        assert_eq!(store.progress().await.unwrap().total_words, 2);
    }

    #[tokio::test]
    async fn delete_adjusts_counters_by_learned_state() {
        let store = InMemoryStore::new();
        let easy = store
            .add_entry(&draft("uno", Language::Spanish, 1))
            .await
            .unwrap();
        let hard = store
            .add_entry(&draft("dos", Language::Spanish, 5))
            .await
            .unwrap();

        store.delete_entry(easy).await.unwrap();
        let progress = store.progress().await.unwrap();
        assert_eq!(progress.total_words, 1);
        assert_eq!(progress.learned_words, 0);

        store.delete_entry(hard).await.unwrap();
        let progress = store.progress().await.unwrap();
        assert_eq!(progress.total_words, 0);
        assert_eq!(progress.learned_words, -1);
    }

    #[tokio::test]
    async fn mark_learned_missing_id_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .mark_learned(EntryId::new(9), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(id) if id == EntryId::new(9)));
        assert_eq!(store.progress().await.unwrap().learned_words, 0);
    }

    #[tokio::test]
    async fn stats_cutoff_is_midnight_of_window_start() {
        let today = fixed_now().date_naive();
        let cutoff = stats_cutoff(today, 7);
        assert_eq!(cutoff.date_naive(), today - Duration::days(7));
        assert_eq!(cutoff.time(), NaiveTime::MIN);
    }
}
