use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Local, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use spaced_recall::database::db;
use spaced_recall::export::json::{export_notes_to_path, import_notes};
use spaced_recall::models::{ReviewSession, sm2};
use spaced_recall::{
    Config, Error, NewNote, Note, NoteStatus, Quality, Result, ReviewOutcome, parse_verdict,
};

/// recall - spaced-repetition notes scheduled with SM-2
#[derive(Parser)]
#[command(name = "recall", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ./recall.toml if present)
    #[arg(short, long, env = "RECALL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the config
    #[arg(long, env = "RECALL_DB")]
    database: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the next interval without touching the database
    Schedule {
        /// Current interval in days
        #[arg(long, default_value_t = 1)]
        interval: u32,
        /// Current easiness factor
        #[arg(long, default_value_t = 2.5)]
        ease: f64,
        /// Grade 0-5
        #[arg(long)]
        quality: u8,
    },
    #[command(flatten)]
    Store(StoreCommand),
}

/// Commands that read or write the note database
#[derive(Subcommand)]
enum StoreCommand {
    /// Add a note
    Add {
        content: String,
        #[arg(short, long)]
        explanation: Option<String>,
        /// Tag, may be repeated
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(long)]
        category: Option<String>,
        /// Estimated difficulty, 1-5
        #[arg(long)]
        difficulty: Option<u8>,
    },
    /// List all notes
    List,
    /// Delete a note and its questions
    Delete { id: i64 },
    /// Change a note's status (active, suspended, archived)
    Status { id: i64, status: NoteStatus },
    /// Show notes due for review
    Due,
    /// Rate a note directly on the 0-5 scale
    Rate { id: i64, quality: u8 },
    /// Attach a review question to a note
    Ask {
        note_id: i64,
        question: String,
        #[arg(long)]
        expected: Option<String>,
    },
    /// Record an answer to a question and reschedule its note
    #[command(group(
        ArgGroup::new("grade")
            .required(true)
            .args(["correct", "incorrect", "quality", "verdict"])
    ))]
    Answer {
        review_id: i64,
        answer: String,
        /// Answer was correct (grade 5)
        #[arg(long)]
        correct: bool,
        /// Answer was wrong (grade 2)
        #[arg(long)]
        incorrect: bool,
        /// Explicit grade 0-5
        #[arg(long)]
        quality: Option<u8>,
        /// File holding the grader's JSON verdict
        #[arg(long)]
        verdict: Option<PathBuf>,
        /// Feedback to store with the answer
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Drill through due notes, reading 0-5 grades from stdin
    Session,
    /// Export all notes to a JSON file
    Export { path: PathBuf },
    /// Import notes from a JSON file
    Import { path: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config.with_database_path(cli.database.clone()),
        Err(e) => {
            eprintln!("recall: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = match (&config.log_filter, cli.verbose) {
        (_, 1) => "spaced_recall=debug".to_string(),
        (_, 2) => "debug".to_string(),
        (_, 3..) => "trace".to_string(),
        (Some(filter), _) => filter.clone(),
        (None, _) => "warn,spaced_recall=info".to_string(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &Config) -> Result<()> {
    let now = Utc::now();

    match command {
        Command::Schedule {
            interval,
            ease,
            quality,
        } => {
            let update = sm2::compute_next_review(interval, ease, Quality::new(quality)?)?;
            println!(
                "interval {} -> {} days, EF {:.2} -> {:.2}, next review {}",
                interval,
                update.new_interval,
                ease,
                update.new_easiness_factor,
                format_date(sm2::next_review_at(now, update.new_interval))
            );
            Ok(())
        }
        Command::Store(command) => {
            let conn = db::init_database(&config.database_path)?;
            run_store(command, now, &conn)
        }
    }
}

fn run_store(command: StoreCommand, now: DateTime<Utc>, conn: &Connection) -> Result<()> {
    match command {
        StoreCommand::Add {
            content,
            explanation,
            tags,
            category,
            difficulty,
        } => {
            let note = NewNote {
                content,
                explanation,
                tags,
                category,
                difficulty_estimate: difficulty,
            };
            let id = db::add_note(&note, now, conn)?;
            println!("Note #{id} added, due now.");
        }
        StoreCommand::List => {
            for note in db::list_notes(conn)? {
                print_note(&note);
            }
        }
        StoreCommand::Delete { id } => {
            db::delete_note(id, conn)?;
            println!("Note #{id} deleted.");
        }
        StoreCommand::Status { id, status } => {
            db::set_note_status(id, status, conn)?;
            println!("Note #{id} is now {status}.");
        }
        StoreCommand::Due => {
            let due = db::due_notes(now, conn)?;
            if due.is_empty() {
                println!("Nothing due.");
            }
            for note in &due {
                print_note(note);
            }
        }
        StoreCommand::Rate { id, quality } => {
            let outcome = db::rate_note(id, Quality::new(quality)?, now, conn)?;
            print_outcome(&outcome);
        }
        StoreCommand::Ask {
            note_id,
            question,
            expected,
        } => {
            let id = db::add_review(note_id, &question, expected.as_deref(), now, conn)?;
            println!("Question #{id} added to note #{note_id}.");
        }
        StoreCommand::Answer {
            review_id,
            answer,
            correct,
            incorrect,
            quality,
            verdict,
            feedback,
        } => {
            let (quality, feedback) = match (verdict, quality) {
                (Some(path), _) => {
                    let verdict = parse_verdict(&std::fs::read_to_string(path)?)?;
                    let quality = verdict.quality();
                    (quality, Some(feedback.unwrap_or(verdict.message)))
                }
                (None, Some(value)) => (Quality::new(value)?, feedback),
                (None, None) if correct || incorrect => {
                    (Quality::from_correctness(correct), feedback)
                }
                (None, None) => {
                    return Err(Error::InvalidInput("no grade given".to_string()));
                }
            };
            let outcome =
                db::record_answer(review_id, &answer, feedback.as_deref(), quality, now, conn)?;
            if let Some(feedback) = feedback {
                println!("{feedback}");
            }
            print_outcome(&outcome);
        }
        StoreCommand::Session => run_session(now, conn)?,
        StoreCommand::Export { path } => {
            let notes = db::list_notes(conn)?;
            export_notes_to_path(&notes, &path)?;
            println!("Exported {} notes to {}", notes.len(), path.display());
        }
        StoreCommand::Import { path } => {
            let notes = import_notes(&path)?;
            for note in &notes {
                db::add_note(note, now, conn)?;
            }
            println!("Imported {} notes from {}", notes.len(), path.display());
        }
    }

    Ok(())
}

fn run_session(now: DateTime<Utc>, conn: &Connection) -> Result<()> {
    let mut session = ReviewSession::from_due(now, conn)?;
    if session.is_completed() {
        println!("Nothing due.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut round = 0;

    while let Some(note) = session.current() {
        if session.round_number() != round {
            round = session.round_number();
            println!("{}", session.phase_message());
        }
        println!("\n{}", note.full_text());
        print!("grade 0-5 (q to stop): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") {
            break;
        }

        let Some(quality) = input.parse::<u8>().ok().and_then(|v| Quality::new(v).ok()) else {
            println!("enter a number between 0 and 5");
            continue;
        };
        if let Some(outcome) = session.grade_current(quality, now, conn)? {
            print_outcome(&outcome);
        }
    }

    if session.is_completed() {
        println!("\nSession complete.");
    } else {
        println!("\nStopped with {} notes left this round.", session.remaining_count());
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!(
        "#{} [{}] due {} (interval {}d, EF {:.2}) {}",
        note.id,
        note.status,
        format_date(note.schedule.next_review_at),
        note.schedule.current_interval,
        note.schedule.easiness_factor,
        note.content
    );
}

fn print_outcome(outcome: &ReviewOutcome) {
    println!(
        "quality {}: interval {} -> {} days, EF {:.2} -> {:.2}, next review {}",
        outcome.quality,
        outcome.previous_interval,
        outcome.update.new_interval,
        outcome.previous_easiness_factor,
        outcome.update.new_easiness_factor,
        format_date(outcome.state.next_review_at)
    );
}

/// Formats a timestamp as a local YYYY-MM-DD string
fn format_date(time: DateTime<Utc>) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d").to_string()
}
