use std::sync::Arc;

use tracing::debug;
use vocab_core::model::{
    DailyStat, EntryDraft, EntryId, Language, ProgressSummary, VocabularyEntry,
};

use crate::Clock;
use crate::error::VocabError;
use storage::repository::VocabRepository;

/// Orchestrates vocabulary tracking on top of the persistence engine.
///
/// Pre-validates caller input for good error messages; the engine's own
/// constraints remain the final authority. Supplies the current time from its
/// clock so the engine stays free of ambient time reads.
#[derive(Clone)]
pub struct VocabService {
    clock: Clock,
    store: Arc<dyn VocabRepository>,
}

impl VocabService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn VocabRepository>) -> Self {
        Self { clock, store }
    }

    /// Validate and persist a new word.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Entry` for validation failures and
    /// `VocabError::Storage` for duplicates or persistence failures.
    pub async fn add_word(
        &self,
        word: &str,
        translation: &str,
        language: Language,
        difficulty: i64,
    ) -> Result<EntryId, VocabError> {
        let draft = EntryDraft {
            word: word.to_owned(),
            translation: translation.to_owned(),
            language,
            difficulty,
        };
        let entry = draft.validate(self.clock.now())?;
        let id = self.store.add_entry(&entry).await?;
        debug!(%id, %language, "word added");
        Ok(id)
    }

    /// Every entry, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` if the read fails.
    pub async fn all_words(&self) -> Result<Vec<VocabularyEntry>, VocabError> {
        Ok(self.store.all_entries().await?)
    }

    /// Entries for one language, hardest first.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` if the read fails.
    pub async fn words_by_language(
        &self,
        language: Language,
    ) -> Result<Vec<VocabularyEntry>, VocabError> {
        Ok(self.store.entries_by_language(language).await?)
    }

    /// Delete a word by id.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` with `NotFound` if the id does not exist.
    pub async fn remove_word(&self, id: EntryId) -> Result<(), VocabError> {
        self.store.delete_entry(id).await?;
        debug!(%id, "word removed");
        Ok(())
    }

    /// Mark a word learned at the service clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` with `NotFound` if the id does not exist.
    pub async fn mark_learned(&self, id: EntryId) -> Result<(), VocabError> {
        self.store.mark_learned(id, self.clock.now()).await?;
        debug!(%id, "word marked learned");
        Ok(())
    }

    /// Current aggregate progress.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` if the read fails.
    pub async fn progress(&self) -> Result<ProgressSummary, VocabError> {
        Ok(self.store.progress().await?)
    }

    /// Daily add/learned counts over the trailing window, today derived from
    /// the service clock.
    ///
    /// # Errors
    ///
    /// Returns `VocabError::Storage` if the read fails.
    pub async fn daily_stats(&self, window_days: u32) -> Result<Vec<DailyStat>, VocabError> {
        let today = self.clock.now().date_naive();
        Ok(self.store.daily_stats(window_days, today).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::{InMemoryStore, StorageError};
    use vocab_core::model::EntryError;
    use vocab_core::time::fixed_clock;

    fn service() -> VocabService {
        VocabService::new(fixed_clock(), Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn rejects_empty_word_before_hitting_storage() {
        let svc = service();
        let err = svc
            .add_word("  ", "house", Language::German, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, VocabError::Entry(EntryError::EmptyField("word"))));
        assert_eq!(svc.progress().await.unwrap().total_words, 0);
    }

    #[tokio::test]
    async fn rejects_out_of_range_difficulty() {
        let svc = service();
        let err = svc
            .add_word("Haus", "house", Language::German, 9)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VocabError::Entry(EntryError::Difficulty(_))
        ));
    }

    #[tokio::test]
    async fn surfaces_duplicate_from_engine() {
        let svc = service();
        svc.add_word("Haus", "house", Language::German, 2)
            .await
            .unwrap();
        let err = svc
            .add_word("Haus", "dwelling", Language::German, 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VocabError::Storage(StorageError::Duplicate { .. })
        ));
    }
}
