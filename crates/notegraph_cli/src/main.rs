//! `notegraph` command line front end.
//!
//! # Responsibility
//! - Parse arguments and drive `NoteService` over a SQLite database.
//! - Print notes as plain text; export commands print their documents verbatim.
//!
//! # Invariants
//! - Every failure is reported on stderr and mapped to a non-zero exit code.

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use notegraph_core::{
    init_logging_with_config, EngineConfig, LoggingError, Note, NoteFields, NoteId, NoteService,
    NoteServiceError, NoteSort, SqliteNotePersistence, SystemClock,
};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const DEFAULT_DB_FILE: &str = "notegraph.db";

#[derive(Parser, Debug)]
#[command(name = "notegraph", version, about = "Linked personal notes")]
struct Cli {
    /// SQLite database file (overrides `db_path` from the config).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for rolling log files (overrides `log_dir` from the config).
    /// Logging stays off when neither is set.
    #[arg(long = "log-dir", global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a note.
    New(NoteArgs),
    /// Overwrite fields of an existing note.
    Edit {
        id: NoteId,
        #[command(flatten)]
        fields: NoteArgs,
    },
    /// Delete a note.
    Rm { id: NoteId },
    /// Resolve `[[links]]` of one note, or of every note with `--all`.
    Resolve {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<NoteId>,
        #[arg(long)]
        all: bool,
    },
    /// List notes.
    Ls {
        #[arg(long, value_enum, default_value_t = SortArg::Inserted)]
        sort: SortArg,
    },
    /// Print one note with its links.
    Show { id: NoteId },
    /// Run a structured query, e.g. `tag:work before:2024-01-01 plan`.
    Search {
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
    /// List notes linking to a note.
    Backlinks { id: NoteId },
    /// List every tag in use.
    Tags,
    /// Open today's note, or the note for `--date YYYY-MM-DD`.
    Daily {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Print all notes as JSON, or one note as markdown with `--id`.
    Export {
        #[arg(long)]
        id: Option<NoteId>,
    },
    /// Replace the collection with a JSON export.
    Import { file: PathBuf },
    /// Check core linkage.
    Ping,
}

#[derive(Args, Debug)]
struct NoteArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    /// Repeatable.
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

impl NoteArgs {
    fn into_fields(self) -> NoteFields {
        let mut fields = NoteFields {
            title: self.title,
            content: self.content,
            tags: None,
        };
        if !self.tags.is_empty() {
            fields = fields.tags(self.tags);
        }
        fields
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SortArg {
    Inserted,
    Updated,
    Title,
}

impl From<SortArg> for NoteSort {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Inserted => NoteSort::Inserted,
            SortArg::Updated => NoteSort::UpdatedDesc,
            SortArg::Title => NoteSort::TitleAsc,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Config(notegraph_core::ConfigError),
    Logging(LoggingError),
    Persistence(notegraph_core::PersistenceError),
    Service(NoteServiceError),
    Io { path: PathBuf, source: std::io::Error },
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Service(NoteServiceError::NoteNotFound(_)) => 3,
            Self::Config(_) | Self::Logging(_) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Logging(err) => write!(f, "logging: {err}"),
            Self::Persistence(err) => write!(f, "database: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl From<notegraph_core::ConfigError> for CliError {
    fn from(value: notegraph_core::ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<notegraph_core::PersistenceError> for CliError {
    fn from(value: notegraph_core::PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<NoteServiceError> for CliError {
    fn from(value: NoteServiceError) -> Self {
        Self::Service(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notegraph: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Command::Ping = cli.command {
        println!("notegraph_core ping={}", notegraph_core::ping());
        println!("notegraph_core version={}", notegraph_core::core_version());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = cli.log_dir.as_ref().or(config.log_dir.as_ref()) {
        init_logging_with_config(&config, dir).map_err(CliError::Logging)?;
    }

    let db_path = cli
        .db
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
    let persistence = SqliteNotePersistence::open(&db_path)?;
    let mut service = NoteService::open(persistence, &config, Arc::new(SystemClock))?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Command::New(args) => {
            let note = service.create(args.into_fields())?;
            println!("{}", note.id);
        }
        Command::Edit { id, fields } => {
            let note = service.update(id, fields.into_fields())?;
            print_summary(&note);
        }
        Command::Rm { id } => {
            let note = service.remove(id)?;
            println!("removed {}", note.id);
        }
        Command::Resolve { id: Some(id), .. } => {
            let note = service.resolve_links(id)?;
            println!(
                "{} resolved={} unresolved={}",
                note.id,
                note.links_out.len(),
                note.unresolved_links.len()
            );
        }
        Command::Resolve { id: None, .. } => {
            let resolved = service.resolve_all()?;
            println!("resolved={resolved}");
        }
        Command::Ls { sort } => {
            for note in service.list_sorted(sort.into()) {
                print_summary(&note);
            }
        }
        Command::Show { id } => {
            let note = service
                .get(id)
                .ok_or(NoteServiceError::NoteNotFound(id))?;
            print_detail(&service, &note);
        }
        Command::Search { query } => {
            for note in service.search(&query.join(" ")) {
                print_summary(&note);
            }
        }
        Command::Backlinks { id } => {
            if service.get(id).is_none() {
                return Err(NoteServiceError::NoteNotFound(id).into());
            }
            for note in service.backlinks(id) {
                print_summary(&note);
            }
        }
        Command::Tags => {
            for tag in service.list_tags() {
                println!("{tag}");
            }
        }
        Command::Daily { date } => {
            let note = match date {
                Some(date) => service.daily_for(date)?,
                None => service.daily()?,
            };
            print_summary(&note);
        }
        Command::Export { id: Some(id) } => {
            println!("{}", service.export_markdown(id)?);
        }
        Command::Export { id: None } => {
            println!("{}", service.export_json()?);
        }
        Command::Import { file } => {
            let json = std::fs::read_to_string(&file).map_err(|source| CliError::Io {
                path: file.clone(),
                source,
            })?;
            let count = service.import_json(&json)?;
            println!("imported={count}");
        }
        Command::Ping => {}
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::New(_) => "new",
        Command::Edit { .. } => "edit",
        Command::Rm { .. } => "rm",
        Command::Resolve { .. } => "resolve",
        Command::Ls { .. } => "ls",
        Command::Show { .. } => "show",
        Command::Search { .. } => "search",
        Command::Backlinks { .. } => "backlinks",
        Command::Tags => "tags",
        Command::Daily { .. } => "daily",
        Command::Export { .. } => "export",
        Command::Import { .. } => "import",
        Command::Ping => "ping",
    }
}

fn display_title(note: &Note) -> &str {
    if note.title.trim().is_empty() {
        "(untitled)"
    } else {
        &note.title
    }
}

fn print_summary(note: &Note) {
    let tags = note.tags.iter().cloned().collect::<Vec<_>>().join(",");
    println!(
        "{}  {}  [{}]  {}",
        note.id,
        notegraph_core::format_timestamp(note.updated_at),
        tags,
        display_title(note)
    );
}

fn print_detail<P: notegraph_core::NotePersistence>(service: &NoteService<P>, note: &Note) {
    print_summary(note);
    for target in &note.links_out {
        let title = service
            .get(*target)
            .map(|linked| display_title(&linked).to_string())
            .unwrap_or_default();
        println!("  -> {target}  {title}");
    }
    for target in &note.unresolved_links {
        println!("  -> ?  {target}");
    }
    for source in service.backlinks(note.id) {
        println!("  <- {}  {}", source.id, display_title(&source));
    }
    println!();
    println!("{}", note.content);
}
