use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{ids::EntryId, language::Language};

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty rating in the range 1..=5. Ratings at or above
/// [`Difficulty::LEARNED_THRESHOLD`] count as "learned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(u8);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("difficulty must be between 1 and 5, got {0}")]
pub struct DifficultyError(pub i64);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const LEARNED_THRESHOLD: u8 = 4;

    /// The rating assigned when an entry is marked learned.
    pub const LEARNED: Difficulty = Difficulty(Self::MAX);

    /// Validates that the raw value lies within 1..=5.
    ///
    /// # Errors
    ///
    /// Returns `DifficultyError` if the value is out of range.
    pub fn try_new(value: i64) -> Result<Self, DifficultyError> {
        let narrow = u8::try_from(value).map_err(|_| DifficultyError(value))?;
        if (Self::MIN..=Self::MAX).contains(&narrow) {
            Ok(Self(narrow))
        } else {
            Err(DifficultyError(value))
        }
    }

    /// Returns the underlying rating.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this rating counts as learned (>= 4).
    #[must_use]
    pub fn is_learned(self) -> bool {
        self.0 >= Self::LEARNED_THRESHOLD
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── ENTRY TYPES ───────────────────────────────────────────────────────────────
//

/// Caller input for a new entry, before validation and before the store has
/// assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub word: String,
    pub translation: String,
    pub language: Language,
    pub difficulty: i64,
}

impl EntryDraft {
    /// Validates field contents and stamps the creation time.
    ///
    /// # Errors
    ///
    /// Returns `EntryError::EmptyField` if word or translation is empty or
    /// whitespace-only, or `EntryError::Difficulty` if the rating is out of
    /// range.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedEntry, EntryError> {
        let word = self.word.trim().to_owned();
        if word.is_empty() {
            return Err(EntryError::EmptyField("word"));
        }
        let translation = self.translation.trim().to_owned();
        if translation.is_empty() {
            return Err(EntryError::EmptyField("translation"));
        }
        let difficulty = Difficulty::try_new(self.difficulty)?;

        Ok(ValidatedEntry {
            word,
            translation,
            language: self.language,
            difficulty,
            created_at: now,
        })
    }
}

/// A validated entry awaiting its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEntry {
    pub word: String,
    pub translation: String,
    pub language: Language,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

impl ValidatedEntry {
    #[must_use]
    pub fn assign_id(self, id: EntryId) -> VocabularyEntry {
        VocabularyEntry {
            id,
            word: self.word,
            translation: self.translation,
            language: self.language,
            difficulty: self.difficulty,
            last_reviewed: None,
            created_at: self.created_at,
        }
    }
}

/// A persisted vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: EntryId,
    pub word: String,
    pub translation: String,
    pub language: Language,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VocabularyEntry {
    /// Whether the entry currently counts as learned.
    #[must_use]
    pub fn is_learned(&self) -> bool {
        self.difficulty.is_learned()
    }
}

//
// ─── VALIDATION ERRORS ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error(transparent)]
    Difficulty(#[from] DifficultyError),
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> EntryDraft {
        EntryDraft {
            word: "Haus".into(),
            translation: "house".into(),
            language: Language::German,
            difficulty: 2,
        }
    }

    #[test]
    fn draft_fails_if_word_empty() {
        let err = EntryDraft {
            word: "   ".into(),
            ..draft()
        }
        .validate(fixed_now())
        .unwrap_err();

        assert_eq!(err, EntryError::EmptyField("word"));
    }

    #[test]
    fn draft_fails_if_translation_empty() {
        let err = EntryDraft {
            translation: String::new(),
            ..draft()
        }
        .validate(fixed_now())
        .unwrap_err();

        assert_eq!(err, EntryError::EmptyField("translation"));
    }

    #[test]
    fn draft_fails_on_out_of_range_difficulty() {
        for bad in [0, 6, -1, 100] {
            let err = EntryDraft {
                difficulty: bad,
                ..draft()
            }
            .validate(fixed_now())
            .unwrap_err();
            assert_eq!(err, EntryError::Difficulty(DifficultyError(bad)));
        }
    }

    #[test]
    fn valid_draft_trims_and_stamps_creation_time() {
        let now = fixed_now();
        let entry = EntryDraft {
            word: "  Haus ".into(),
            ..draft()
        }
        .validate(now)
        .unwrap();

        assert_eq!(entry.word, "Haus");
        assert_eq!(entry.created_at, now);

        let entry = entry.assign_id(EntryId::new(7));
        assert_eq!(entry.id, EntryId::new(7));
        assert_eq!(entry.last_reviewed, None);
        assert!(!entry.is_learned());
    }

    #[test]
    fn learned_threshold_is_four() {
        assert!(!Difficulty::try_new(3).unwrap().is_learned());
        assert!(Difficulty::try_new(4).unwrap().is_learned());
        assert!(Difficulty::LEARNED.is_learned());
        assert_eq!(Difficulty::LEARNED.value(), 5);
    }
}
