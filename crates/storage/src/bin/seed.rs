use std::fmt;

use storage::repository::{ContentWriter, SeedDocument};
use storage::sqlite::SqliteRepository;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    file: String,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidFile { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidFile { raw } => write!(f, "invalid --file value: {raw}"),
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
        let mut db_url = std::env::var("ESSENTIALS_DB_URL")
            .unwrap_or_else(|_| "sqlite:essentials.sqlite3?mode=rwc".into());
        let mut file =
            std::env::var("ESSENTIALS_SEED_FILE").unwrap_or_else(|_| "seed-data.json".into());

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
                "--file" => {
                    let value = require_value(&mut args, "--file")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidFile { raw: value });
                    }
                    file = value;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, file })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:essentials.sqlite3?mode=rwc)");
    eprintln!("  --file <path>       Seed document with paths and lessons (default: seed-data.json)");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  ESSENTIALS_DB_URL, ESSENTIALS_SEED_FILE");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = std::fs::read_to_string(&args.file)?;
    let document: SeedDocument = serde_json::from_str(&raw)?;

    let repo = SqliteRepository::connect(&args.db_url).await?;
    repo.migrate().await?;

    let mut paths = 0_usize;
    for record in document.paths {
        let path = record.into_path()?;
        repo.upsert_path(&path).await?;
        paths += 1;
    }

    let mut lessons = 0_usize;
    for record in document.lessons {
        let lesson = record.into_lesson()?;
        repo.upsert_lesson(&lesson).await?;
        lessons += 1;
    }

    println!(
        "Seeded {paths} paths and {lessons} lessons from {} into {}",
        args.file, args.db_url
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
