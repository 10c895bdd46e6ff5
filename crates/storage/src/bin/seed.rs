use std::fmt;

use chrono::{DateTime, Utc};
use storage::repository::{StorageError, VocabRepository};
use storage::sqlite::SqliteVocabStore;
use vocab_core::model::{EntryDraft, Language};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    words: usize,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidWords { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidWords { raw } => write!(f, "invalid --words value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("VOCAB_DB_URL").unwrap_or_else(|_| "sqlite:vocab.sqlite3".into());
        let mut words = std::env::var("VOCAB_SEED_WORDS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(8);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--words" => {
                    let value = require_value(&mut args, "--words")?;
                    words = value
                        .parse::<usize>()
                        .map_err(|_| ArgsError::InvalidWords { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, words, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:vocab.sqlite3)");
    eprintln!("  --words <n>         Number of sample words to add (default: 8)");
    eprintln!("  --now <rfc3339>     Fixed current time for deterministic seeding");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  VOCAB_DB_URL, VOCAB_SEED_WORDS");
}

const SAMPLES: [(&str, &str, Language, i64); 8] = [
    ("Hallo", "hello", Language::German, 1),
    ("Danke", "thank you", Language::German, 2),
    ("gato", "cat", Language::Spanish, 1),
    ("biblioteca", "library", Language::Spanish, 3),
    ("bonjour", "good day", Language::French, 1),
    ("neko", "cat", Language::Japanese, 2),
    ("serendipity", "lucky find", Language::English, 4),
    ("kniga", "book", Language::Russian, 2),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let store = SqliteVocabStore::open(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut added = 0usize;
    let mut skipped = 0usize;
    for &(word, translation, language, difficulty) in SAMPLES.iter().cycle().take(args.words) {
        let entry = EntryDraft {
            word: word.to_string(),
            translation: translation.to_string(),
            language,
            difficulty,
        }
        .validate(now)?;

        match store.add_entry(&entry).await {
            Ok(_) => added += 1,
            // re-running the seed against an existing database is fine
            Err(StorageError::Duplicate { .. }) => skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "Seeded {added} words ({skipped} duplicates skipped) into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
