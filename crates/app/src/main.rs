use std::fmt;

use essentials_core::model::{ColorScheme, IdError, LessonId, PathId};
use services::AppServices;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Command;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingOperand { command: &'static str },
    UnexpectedOperand(String),
    InvalidDbUrl { raw: String },
    InvalidPlatformScheme { raw: String },
    InvalidId(IdError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingOperand { command } => write!(f, "{command} requires an id"),
            ArgsError::UnexpectedOperand(arg) => write!(f, "unexpected argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPlatformScheme { raw } => {
                write!(f, "invalid --platform-scheme value: {raw} (expected light or dark)")
            }
            ArgsError::InvalidId(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<IdError> for ArgsError {
    fn from(err: IdError) -> Self {
        ArgsError::InvalidId(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug)]
struct Args {
    db_url: String,
    platform: ColorScheme,
    command: Command,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  essentials [options] [command]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status              Overall progress, next lesson and theme (default)");
    eprintln!("  paths               Paths with per-section progress");
    eprintln!("  path <id>           Lessons of a path with completion marks");
    eprintln!("  lesson <id>         Show a lesson");
    eprintln!("  toggle <id>         Flip completion of a lesson");
    eprintln!("  complete <id>       Mark a lesson complete and show what comes next");
    eprintln!("  continue            First unfinished lesson");
    eprintln!("  next <id>           Lesson after <id> in its path");
    eprintln!("  reset               Delete all progress");
    eprintln!("  theme [mode]        Show or set the theme (light, dark, system)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>            SQLite URL (default: sqlite://essentials.sqlite3)");
    eprintln!("  --platform-scheme <scheme>   Scheme reported by the platform (default: light)");
    eprintln!("  -h, --help                   Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ESSENTIALS_DB_URL, ESSENTIALS_PLATFORM_SCHEME, RUST_LOG");
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ESSENTIALS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://essentials.sqlite3".into(), normalize_sqlite_url);
        let mut platform = match std::env::var("ESSENTIALS_PLATFORM_SCHEME") {
            Ok(raw) => parse_scheme(raw)?,
            Err(_) => ColorScheme::default(),
        };

        let mut positionals = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--platform-scheme" => {
                    platform = parse_scheme(require_value(&mut args, "--platform-scheme")?)?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        Ok(Self {
            db_url,
            platform,
            command: parse_command(positionals)?,
        })
    }
}

fn parse_scheme(raw: String) -> Result<ColorScheme, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidPlatformScheme { raw })
}

fn parse_command(positionals: Vec<String>) -> Result<Command, ArgsError> {
    let mut words = positionals.into_iter();
    let Some(name) = words.next() else {
        return Ok(Command::Status);
    };

    let command = match name.as_str() {
        "status" => Command::Status,
        "paths" => Command::Paths,
        "path" => Command::Path(PathId::new(operand(&mut words, "path")?)?),
        "lesson" => Command::Lesson(LessonId::new(operand(&mut words, "lesson")?)?),
        "toggle" => Command::Toggle(LessonId::new(operand(&mut words, "toggle")?)?),
        "complete" => Command::Complete(LessonId::new(operand(&mut words, "complete")?)?),
        "continue" => Command::Continue,
        "next" => Command::Next(LessonId::new(operand(&mut words, "next")?)?),
        "reset" => Command::Reset,
        "theme" => Command::Theme(words.next()),
        _ => return Err(ArgsError::UnknownCommand(name)),
    };

    match words.next() {
        Some(extra) => Err(ArgsError::UnexpectedOperand(extra)),
        None => Ok(command),
    }
}

fn operand(
    words: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<String, ArgsError> {
    words.next().ok_or(ArgsError::MissingOperand { command })
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url).await?;
    tracing::debug!(db_url = %args.db_url, command = ?args.command, "running command");

    commands::execute(&services, args.platform, args.command).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn no_command_means_status() {
        assert!(matches!(parse_command(Vec::new()), Ok(Command::Status)));
    }

    #[test]
    fn id_commands_require_an_operand() {
        assert!(matches!(
            parse_command(words(&["toggle"])),
            Err(ArgsError::MissingOperand { command: "toggle" })
        ));
        assert!(matches!(
            parse_command(words(&["next", "   "])),
            Err(ArgsError::InvalidId(_))
        ));
    }

    #[test]
    fn parses_id_commands() {
        let Ok(Command::Toggle(id)) = parse_command(words(&["toggle", "wudu"])) else {
            panic!("expected toggle");
        };
        assert_eq!(id.as_str(), "wudu");

        assert!(matches!(
            parse_command(words(&["theme"])),
            Ok(Command::Theme(None))
        ));
        assert!(matches!(
            parse_command(words(&["theme", "dark"])),
            Ok(Command::Theme(Some(ref mode))) if mode == "dark"
        ));
    }

    #[test]
    fn rejects_trailing_words_and_unknown_commands() {
        assert!(matches!(
            parse_command(words(&["reset", "now"])),
            Err(ArgsError::UnexpectedOperand(_))
        ));
        assert!(matches!(
            parse_command(words(&["delete"])),
            Err(ArgsError::UnknownCommand(_))
        ));
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/app.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/app.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite://already.db".into()),
            "sqlite://already.db"
        );
    }

    #[test]
    fn platform_scheme_must_be_light_or_dark() {
        assert_eq!(parse_scheme("dark".into()).unwrap(), ColorScheme::Dark);
        assert!(matches!(
            parse_scheme("system".into()),
            Err(ArgsError::InvalidPlatformScheme { .. })
        ));
    }
}
