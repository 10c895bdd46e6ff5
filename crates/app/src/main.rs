use std::fmt;
use std::sync::Arc;

use services::{Clock, VocabService};
use storage::sqlite::SqliteVocabStore;
use tracing::info;
use vocab_core::model::{EntryId, Language, SUPPORTED_LANGUAGES};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingId,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidId { raw: String },
    InvalidDays { raw: String },
    InvalidDifficulty { raw: String },
    InvalidLanguage { raw: String },
    MissingField { flag: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingId => write!(f, "expected an entry id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid entry id: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --days value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw}")
            }
            ArgsError::InvalidLanguage { raw } => {
                write!(f, "unsupported language: {raw} (see `vocab languages`)")
            }
            ArgsError::MissingField { flag } => write!(f, "{flag} is required"),
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

#[derive(Debug)]
enum Command {
    Add {
        word: String,
        translation: String,
        language: Language,
        difficulty: i64,
    },
    List,
    ByLanguage(Language),
    Learn(EntryId),
    Delete(EntryId),
    Progress,
    Stats { days: u32 },
    Languages,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vocab add --word <w> --translation <t> --language <l> [--difficulty <1-5>]");
    eprintln!("  vocab list");
    eprintln!("  vocab by-language <language>");
    eprintln!("  vocab learn <id>");
    eprintln!("  vocab delete <id>");
    eprintln!("  vocab progress");
    eprintln!("  vocab stats [--days <n>]");
    eprintln!("  vocab languages");
    eprintln!();
    eprintln!("Global options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:vocab.sqlite3)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  VOCAB_DB_URL");
}

struct Cli {
    db_url: String,
    command: Command,
}

impl Cli {
    #[allow(clippy::too_many_lines)]
    fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("VOCAB_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://vocab.sqlite3".into(), normalize_sqlite_url);

        let mut iter = argv.into_iter();
        let subcommand = loop {
            match iter.next() {
                None => {
                    print_usage();
                    std::process::exit(0);
                }
                Some(arg) if arg == "--help" || arg == "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                Some(arg) if arg == "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                Some(arg) => break arg,
            }
        };

        let parse_id = |raw: String| -> Result<EntryId, ArgsError> {
            raw.parse().map_err(|_| ArgsError::InvalidId { raw })
        };
        let parse_language = |raw: String| -> Result<Language, ArgsError> {
            raw.parse().map_err(|_| ArgsError::InvalidLanguage { raw })
        };

        let command = match subcommand.as_str() {
            "add" => {
                let mut word = None;
                let mut translation = None;
                let mut language = None;
                let mut difficulty = 1i64;
                while let Some(arg) = iter.next() {
                    match arg.as_str() {
                        "--word" => word = Some(require_value(&mut iter, "--word")?),
                        "--translation" => {
                            translation = Some(require_value(&mut iter, "--translation")?);
                        }
                        "--language" => {
                            let value = require_value(&mut iter, "--language")?;
                            language = Some(parse_language(value)?);
                        }
                        "--difficulty" => {
                            let value = require_value(&mut iter, "--difficulty")?;
                            difficulty = value
                                .parse()
                                .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                        }
                        "--db" => {
                            let value = require_value(&mut iter, "--db")?;
                            db_url = normalize_sqlite_url(value);
                        }
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Command::Add {
                    word: word.ok_or(ArgsError::MissingField { flag: "--word" })?,
                    translation: translation
                        .ok_or(ArgsError::MissingField { flag: "--translation" })?,
                    language: language.ok_or(ArgsError::MissingField { flag: "--language" })?,
                    difficulty,
                }
            }
            "list" => Command::List,
            "by-language" => {
                let raw = iter.next().ok_or(ArgsError::MissingField {
                    flag: "<language>",
                })?;
                Command::ByLanguage(parse_language(raw)?)
            }
            "learn" => Command::Learn(parse_id(iter.next().ok_or(ArgsError::MissingId)?)?),
            "delete" => Command::Delete(parse_id(iter.next().ok_or(ArgsError::MissingId)?)?),
            "progress" => Command::Progress,
            "stats" => {
                let mut days = 7u32;
                while let Some(arg) = iter.next() {
                    match arg.as_str() {
                        "--days" => {
                            let value = require_value(&mut iter, "--days")?;
                            days = value
                                .parse()
                                .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                        }
                        "--db" => {
                            let value = require_value(&mut iter, "--db")?;
                            db_url = normalize_sqlite_url(value);
                        }
                        _ => return Err(ArgsError::UnknownArg(arg)),
                    }
                }
                Command::Stats { days }
            }
            "languages" => Command::Languages,
            other => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        Ok(Self { db_url, command })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn format_optional_time(t: Option<chrono::DateTime<chrono::Utc>>) -> String {
    t.map_or_else(
        || "not reviewed".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse(std::env::args().skip(1).collect()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if let Command::Languages = cli.command {
        for lang in SUPPORTED_LANGUAGES {
            println!("{lang}");
        }
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&cli.db_url)?;
    let store = SqliteVocabStore::open(&cli.db_url).await?;
    info!(db = %cli.db_url, "store opened");
    let service = VocabService::new(Clock::default_clock(), Arc::new(store));

    match cli.command {
        Command::Languages => unreachable!("handled above"),
        Command::Add {
            word,
            translation,
            language,
            difficulty,
        } => {
            let id = service
                .add_word(&word, &translation, language, difficulty)
                .await?;
            println!("added entry {id}: {word} = {translation} [{language}]");
        }
        Command::List => {
            for entry in service.all_words().await? {
                println!(
                    "{:>4}  {:<20} {:<20} {:<10} difficulty {}  {}",
                    entry.id,
                    entry.word,
                    entry.translation,
                    entry.language,
                    entry.difficulty,
                    format_optional_time(entry.last_reviewed),
                );
            }
        }
        Command::ByLanguage(language) => {
            for entry in service.words_by_language(language).await? {
                println!(
                    "{:>4}  {:<20} {:<20} difficulty {}",
                    entry.id, entry.word, entry.translation, entry.difficulty,
                );
            }
        }
        Command::Learn(id) => {
            service.mark_learned(id).await?;
            println!("entry {id} marked learned");
        }
        Command::Delete(id) => {
            service.remove_word(id).await?;
            println!("entry {id} deleted");
        }
        Command::Progress => {
            let progress = service.progress().await?;
            println!("total words:   {}", progress.total_words);
            println!("learned words: {}", progress.learned_words);
            println!("progress:      {:.1}%", progress.progress_percentage());
            println!("streak days:   {}", progress.streak_days);
            println!(
                "last active:   {}",
                format_optional_time(progress.last_active)
            );
        }
        Command::Stats { days } => {
            for stat in service.daily_stats(days).await? {
                println!(
                    "{}  added {:>3}  learned {:>3}",
                    stat.date, stat.added, stat.learned
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
