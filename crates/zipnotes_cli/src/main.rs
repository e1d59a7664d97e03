//! Command-line front end over `zipnotes_core`.
//!
//! # Responsibility
//! - Drive the note store the way an interactive UI would: load, mutate, save.
//! - Print core failures on stderr and exit non-zero; never panic.

use clap::{Parser, Subcommand};
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use zipnotes_core::{
    core_version, default_log_level, init_logging, Collection, EntryArchive, NoteService,
    Preferences, RecordId, SystemClock, TimeZoneKind, ZipArchiveFile,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Parser)]
#[command(name = "zipnotes", version, about = "Notes kept in a single zip archive")]
struct Cli {
    /// Archive file; defaults to the location stored in preferences.
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    /// Directory holding the preferences file.
    #[arg(long, global = true, default_value = ".")]
    home: PathBuf,

    /// Absolute directory for rolling log files; logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List live notes.
    List,
    /// Print every field of one note.
    Show { id: RecordId },
    /// Add a note.
    Add {
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Extra `key=value` field; repeatable.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Change subject and/or body of a note.
    Edit {
        id: RecordId,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete a note.
    Delete { id: RecordId },
    /// Copy a note under a new id.
    Clone { id: RecordId },
    /// List archive entry names.
    Entries,
    /// Store a text file as an extra archive entry.
    Attach { name: String, file: PathBuf },
    /// Print the core version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zipnotes: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), log_dir)?;
    }

    let archive_path = match cli.archive {
        Some(path) => path,
        None => Preferences::load(&cli.home).archive_path(),
    };
    debug!("event=cli_start module=cli archive={}", archive_path.display());
    let service = NoteService::new(ZipArchiveFile::new(archive_path), SystemClock);

    match cli.command {
        Command::List => {
            let collection = service.load()?;
            for record in collection.iter() {
                let when = record
                    .time_display(TimeZoneKind::Local)
                    .unwrap_or_else(|| format!("@{}", record.time()));
                println!("{}  {}  {}", record.id(), when, record.subject());
            }
        }
        Command::Show { id } => {
            let collection = service.load()?;
            let record = collection
                .lookup(id)
                .ok_or_else(|| format!("note not found: {id}"))?;
            for (name, value) in record.iter() {
                println!("{name}: {value}");
            }
        }
        Command::Add {
            subject,
            body,
            fields,
        } => {
            let mut collection = service.load()?;
            let record = collection.create(service.clock())?;
            record.set_subject(subject);
            record.set_data(body);
            for (key, value) in fields {
                record.set(key, value)?;
            }
            let id = record.id();
            service.save(&collection)?;
            println!("{id}");
        }
        Command::Edit { id, subject, body } => {
            let mut collection = service.load()?;
            let record = collection
                .lookup_mut(id)
                .ok_or_else(|| format!("note not found: {id}"))?;
            if let Some(subject) = subject {
                record.set_subject(subject);
            }
            if let Some(body) = body {
                record.set_data(body);
            }
            service.save(&collection)?;
        }
        Command::Delete { id } => {
            let mut collection = service.load()?;
            collection.delete(id)?;
            collection.pack();
            service.save(&collection)?;
        }
        Command::Clone { id } => {
            let mut collection: Collection = service.load()?;
            let source = collection
                .lookup(id)
                .ok_or_else(|| format!("note not found: {id}"))?;
            let copy = service.clone_note(source);
            let copy_id = copy.id();
            collection.append(copy, true)?;
            service.save(&collection)?;
            println!("{copy_id}");
        }
        Command::Entries => {
            if service.archive().exists() {
                for name in service.archive().list()? {
                    println!("{name}");
                }
            }
        }
        Command::Attach { name, file } => {
            let payload = std::fs::read_to_string(&file)?;
            service.attach(&name, &payload)?;
        }
        Command::Version => println!("zipnotes_core {}", core_version()),
    }

    Ok(())
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}
