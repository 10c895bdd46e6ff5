use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;
use vocab_core::model::{
    DailyStat, Difficulty, EntryId, Language, ProgressSummary, ValidatedEntry, VocabularyEntry,
};

use super::{PROGRESS_ROW_ID, SqliteVocabStore};
use crate::progress_update;
use crate::repository::{StorageError, VocabRepository, stats_cutoff};
use crate::sqlite::mapping::{entry_id_from_i64, entry_id_to_i64, map_entry_row, map_progress_row};

fn map_sqlx(e: sqlx::Error) -> StorageError {
    match e.as_database_error() {
        Some(db) if db.is_check_violation() => StorageError::Constraint(db.message().to_owned()),
        _ => StorageError::Connection(e.to_string()),
    }
}

const ENTRY_COLUMNS: &str = "id, word, translation, language, difficulty, last_reviewed, created_at";

impl SqliteVocabStore {
    /// Reads the singleton progress row inside an open transaction.
    async fn progress_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
    ) -> Result<ProgressSummary, StorageError> {
        let row = sqlx::query(
            "SELECT total_words, learned_words, streak_days, last_active \
             FROM user_progress WHERE id = ?1",
        )
        .bind(PROGRESS_ROW_ID)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| StorageError::Constraint("progress row missing".into()))?;

        map_progress_row(&row)
    }

    /// Writes the singleton progress row inside an open transaction.
    async fn write_progress_in_tx(
        tx: &mut Transaction<'_, Sqlite>,
        summary: &ProgressSummary,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE user_progress \
             SET total_words = ?1, learned_words = ?2, streak_days = ?3, last_active = ?4 \
             WHERE id = ?5",
        )
        .bind(summary.total_words)
        .bind(summary.learned_words)
        .bind(summary.streak_days)
        .bind(summary.last_active)
        .bind(PROGRESS_ROW_ID)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl VocabRepository for SqliteVocabStore {
    async fn add_entry(&self, entry: &ValidatedEntry) -> Result<EntryId, StorageError> {
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        let existing = sqlx::query("SELECT id FROM words WHERE word = ?1 AND language = ?2")
            .bind(&entry.word)
            .bind(entry.language.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        if existing.is_some() {
            return Err(StorageError::Duplicate {
                word: entry.word.clone(),
                language: entry.language,
            });
        }

        let result = sqlx::query(
            r"
            INSERT INTO words (word, translation, language, difficulty, last_reviewed, created_at)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5)
            ",
        )
        .bind(&entry.word)
        .bind(&entry.translation)
        .bind(entry.language.as_str())
        .bind(i64::from(entry.difficulty.value()))
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            // backstop for the unique (word, language) index
            match e.as_database_error() {
                Some(db) if db.is_unique_violation() => StorageError::Duplicate {
                    word: entry.word.clone(),
                    language: entry.language,
                },
                _ => map_sqlx(e),
            }
        })?;

        let id = entry_id_from_i64(result.last_insert_rowid())?;

        let mut summary = Self::progress_in_tx(&mut tx).await?;
        progress_update::apply_added(&mut summary);
        Self::write_progress_in_tx(&mut tx, &summary).await?;

        tx.commit().await.map_err(map_sqlx)?;
        debug!(%id, word = %entry.word, language = %entry.language, "entry added");
        Ok(id)
    }

    async fn all_entries(&self) -> Result<Vec<VocabularyEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM words ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(map_entry_row).collect()
    }

    async fn delete_entry(&self, id: EntryId) -> Result<(), StorageError> {
        let raw_id = entry_id_to_i64(id)?;
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        let row = sqlx::query("SELECT difficulty FROM words WHERE id = ?1")
            .bind(raw_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?
            .ok_or(StorageError::NotFound(id))?;
        let difficulty: i64 = row
            .try_get("difficulty")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let was_learned = difficulty >= i64::from(Difficulty::LEARNED_THRESHOLD);

        sqlx::query("DELETE FROM words WHERE id = ?1")
            .bind(raw_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        let mut summary = Self::progress_in_tx(&mut tx).await?;
        progress_update::apply_deleted(&mut summary, was_learned);
        Self::write_progress_in_tx(&mut tx, &summary).await?;

        tx.commit().await.map_err(map_sqlx)?;
        debug!(%id, was_learned, "entry deleted");
        Ok(())
    }

    async fn mark_learned(&self, id: EntryId, now: DateTime<Utc>) -> Result<(), StorageError> {
        let raw_id = entry_id_to_i64(id)?;
        let mut tx = self.pool().begin().await.map_err(map_sqlx)?;

        let existing = sqlx::query("SELECT id FROM words WHERE id = ?1")
            .bind(raw_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        if existing.is_none() {
            return Err(StorageError::NotFound(id));
        }

        sqlx::query("UPDATE words SET difficulty = ?1, last_reviewed = ?2 WHERE id = ?3")
            .bind(i64::from(Difficulty::LEARNED.value()))
            .bind(now)
            .bind(raw_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        let mut summary = Self::progress_in_tx(&mut tx).await?;
        progress_update::apply_learned(&mut summary, now);
        Self::write_progress_in_tx(&mut tx, &summary).await?;

        tx.commit().await.map_err(map_sqlx)?;
        debug!(%id, streak_days = summary.streak_days, "entry marked learned");
        Ok(())
    }

    async fn progress(&self) -> Result<ProgressSummary, StorageError> {
        let row = sqlx::query(
            "SELECT total_words, learned_words, streak_days, last_active \
             FROM user_progress WHERE id = ?1",
        )
        .bind(PROGRESS_ROW_ID)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx)?
        .ok_or_else(|| StorageError::Constraint("progress row missing".into()))?;

        map_progress_row(&row)
    }

    async fn entries_by_language(
        &self,
        language: Language,
    ) -> Result<Vec<VocabularyEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM words WHERE language = ?1 \
             ORDER BY difficulty DESC, id ASC"
        ))
        .bind(language.as_str())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(map_entry_row).collect()
    }

    async fn daily_stats(
        &self,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DailyStat>, StorageError> {
        let cutoff = stats_cutoff(today, window_days);

        let rows = sqlx::query(
            r"
            SELECT
                DATE(created_at) AS day,
                COUNT(*) AS added,
                SUM(CASE WHEN difficulty >= ?1 THEN 1 ELSE 0 END) AS learned
            FROM words
            WHERE created_at >= ?2
            GROUP BY DATE(created_at)
            ORDER BY day ASC
            ",
        )
        .bind(i64::from(Difficulty::LEARNED_THRESHOLD))
        .bind(cutoff)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                let ser = |e: sqlx::Error| StorageError::Serialization(e.to_string());
                Ok(DailyStat {
                    date: row.try_get("day").map_err(ser)?,
                    added: row.try_get("added").map_err(ser)?,
                    learned: row.try_get("learned").map_err(ser)?,
                })
            })
            .collect()
    }
}
