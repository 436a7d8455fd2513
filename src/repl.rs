//! Interactive question loop.
//!
//! Every line is a question unless it is one of the built-in commands:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `exit`, `quit` | Leave the session |
//! | `clear cache` | Drop the cached schema |
//! | `schema` | Print the schema as sent to the model |
//! | `help` | List commands |
//!
//! Commands are case-insensitive. Ctrl-C discards the current line and
//! Ctrl-D leaves the session.

use std::{
    io::{self, Write},
    time::Duration
};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::debug;

use crate::{
    app::{Answer, Session},
    error::{AppResult, config_error, write_error},
    llm::Completion,
    output::{OutputFormat, OutputOptions, format_results}
};

const PROMPT: &str = "promptdb> ";

const REJECTED_WARNING: &str =
    "Warning: Generated query is not read-only. Query execution aborted to protect data integrity.";

/// Parsed REPL input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Exit,
    ClearCache,
    Schema,
    Help,
    Question(String)
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_lowercase().as_str() {
            "exit" | "quit" => Self::Exit,
            "clear cache" => Self::ClearCache,
            "schema" => Self::Schema,
            "help" => Self::Help,
            _ => Self::Question(line.to_string())
        }
    }
}

/// Run the interactive loop until the user exits.
pub async fn run_repl<C: Completion>(session: &Session<C>, opts: &OutputOptions) -> AppResult<()> {
    let mut rl =
        DefaultEditor::new().map_err(|e| config_error(format!("Failed to init editor: {}", e)))?;

    println!("Ask a question about your database. Type `help` for commands, `exit` to quit.\n");

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(config_error(format!("Readline error: {}", e)))
        };

        let command = ReplCommand::parse(&line);
        if command != ReplCommand::Empty {
            // History is a convenience; failing to record it is not fatal
            if let Err(e) = rl.add_history_entry(line.trim()) {
                debug!(error = %e, "Failed to record history entry");
            }
        }

        match command {
            ReplCommand::Empty => {}
            ReplCommand::Exit => break,
            ReplCommand::ClearCache => {
                session.clear_cache();
                println!("Schema cache cleared.");
            }
            ReplCommand::Schema => match session.schema() {
                Ok(schema) => println!("{}\n", schema.to_prompt()),
                Err(e) => print_error(&e, opts)
            },
            ReplCommand::Help => print_help(),
            ReplCommand::Question(question) => {
                let mut stdout = io::stdout();
                if let Err(e) = answer_question(session, &question, opts, &mut stdout).await {
                    print_error(&e, opts);
                }
            }
        }
    }

    println!("Exiting the application. Goodbye!");
    Ok(())
}

/// Ask one question and write the outcome to `out`.
///
/// The generated SQL is shown before it runs, so it stays visible when
/// execution fails. Returns `true` when the generated SQL was executed.
pub async fn answer_question<C: Completion, W: Write>(
    session: &Session<C>,
    question: &str,
    opts: &OutputOptions,
    out: &mut W
) -> AppResult<bool> {
    let pb = spinner(opts);
    let generated = session.generate(question).await;
    pb.finish_and_clear();
    let sql = generated?;

    if opts.format == OutputFormat::Text {
        let shown = if opts.colored {
            sql.yellow().to_string()
        } else {
            sql.clone()
        };
        writeln!(out, "\nAttempting Query:\n{}\n", shown).map_err(write_error)?;
    }

    match session.run(sql)? {
        Answer::Executed {
            results, ..
        } => {
            writeln!(out, "{}\n", format_results(&results, opts)).map_err(write_error)?;
            Ok(true)
        }
        Answer::Rejected {
            verdict, ..
        } => {
            let warning = format!("{} ({})", REJECTED_WARNING, verdict);
            if opts.colored {
                eprintln!("{}", warning.red().bold());
            } else {
                eprintln!("{}", warning);
            }
            Ok(false)
        }
    }
}

fn spinner(opts: &OutputOptions) -> ProgressBar {
    if !opts.colored {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Generating SQL...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_error(error: &masterror::AppError, opts: &OutputOptions) {
    if opts.colored {
        eprintln!("{} {}", "Error:".red().bold(), error);
    } else {
        eprintln!("Error: {}", error);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  exit, quit    leave the session");
    println!("  clear cache   forget the cached schema");
    println!("  schema        show the schema sent to the model");
    println!("  help          show this message");
    println!("Anything else is sent to the model as a question.\n");
}
