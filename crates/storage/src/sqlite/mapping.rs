use sqlx::Row;
use vocab_core::model::{Difficulty, EntryId, Language, ProgressSummary, VocabularyEntry};

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn entry_id_from_i64(v: i64) -> Result<EntryId, StorageError> {
    u64::try_from(v)
        .map(EntryId::new)
        .map_err(|_| StorageError::Serialization("entry id sign overflow".into()))
}

pub(crate) fn entry_id_to_i64(id: EntryId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("entry id overflow".into()))
}

pub(crate) fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<VocabularyEntry, StorageError> {
    let language_str: String = row.try_get("language").map_err(ser)?;
    let language: Language = language_str.parse().map_err(ser)?;

    let difficulty_i64: i64 = row.try_get("difficulty").map_err(ser)?;
    let difficulty = Difficulty::try_new(difficulty_i64).map_err(ser)?;

    Ok(VocabularyEntry {
        id: entry_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        word: row.try_get("word").map_err(ser)?,
        translation: row.try_get("translation").map_err(ser)?,
        language,
        difficulty,
        last_reviewed: row.try_get("last_reviewed").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ProgressSummary, StorageError> {
    Ok(ProgressSummary {
        total_words: row.try_get("total_words").map_err(ser)?,
        learned_words: row.try_get("learned_words").map_err(ser)?,
        streak_days: row.try_get("streak_days").map_err(ser)?,
        last_active: row.try_get("last_active").map_err(ser)?,
    })
}
