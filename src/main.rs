//! # promptdb
//!
//! Ask a SQLite database questions in natural language.
//!
//! The question and a compact description of the schema go to an LLM, which
//! answers with SQL. The SQL only runs if it is a read-only `SELECT`; anything
//! else is refused with a warning.
//!
//! # Quick Start
//!
//! ```bash
//! export LLM_API_KEY="sk-..."
//!
//! # Interactive session
//! promptdb -d shop.db repl
//!
//! # One question
//! promptdb -d shop.db ask "how many orders were placed last week?"
//!
//! # Show the prompt without calling the model
//! promptdb -d shop.db ask --dry-run "top customers by revenue"
//!
//! # Check a statement without running it
//! promptdb check "DELETE FROM orders"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Error, or the generated/checked SQL is not read-only

use std::{
    fs::read_to_string,
    io::{self, Read},
    path::PathBuf,
    process
};

use clap::Parser;
use colored::Colorize;
use promptdb::{
    app::{
        Session, build_llm_provider, get_effective_model, get_effective_ollama_url,
        resolve_provider
    },
    cli::{Cli, Commands, Format, GlobalArgs},
    config::Config,
    db::Database,
    error::{AppResult, config_error, file_read_error},
    guard,
    llm::{LlmClient, build_prompt},
    logging::init_logging,
    output::{OutputFormat, OutputOptions},
    repl::{answer_question, run_repl},
    schema::{Schema, SqlDialect}
};
use tokio::main;
use tracing::debug;

#[main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let global = cli.global;

    let level = global
        .log_level
        .clone()
        .unwrap_or_else(|| config.log.level.clone());
    init_logging(&level, !global.no_color)?;
    debug!(database = ?config.database.path, "Configuration loaded");

    let opts = OutputOptions {
        format:  match global.output_format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml
        },
        colored: !global.no_color,
        limits:  config.output
    };

    match cli.command {
        Commands::Check {
            sql
        } => {
            let sql = if sql == "-" {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| file_read_error("stdin", e))?;
                buffer
            } else {
                sql
            };
            let verdict = guard::check(&sql);
            match opts.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&verdict).unwrap_or_default())
                }
                OutputFormat::Yaml => {
                    print!("{}", serde_yaml::to_string(&verdict).unwrap_or_default())
                }
                OutputFormat::Text if verdict.is_read_only() => {
                    println!("{}: {}", paint("read-only", opts.colored, true), verdict)
                }
                OutputFormat::Text => {
                    println!("{}: {}", paint("rejected", opts.colored, false), verdict)
                }
            }
            Ok(if verdict.is_read_only() { 0 } else { 1 })
        }
        Commands::Schema => {
            let schema = load_schema(&global, &config)?;
            match opts.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&schema).unwrap_or_default())
                }
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&schema).unwrap_or_default()),
                OutputFormat::Text => println!("{}", schema.to_prompt())
            }
            Ok(0)
        }
        Commands::Ask {
            question,
            dry_run: true
        } => {
            let schema = load_schema(&global, &config)?;
            println!("=== DRY RUN - Would send to LLM ===\n");
            println!("{}", build_prompt(&schema.to_prompt(), &question.join(" ")));
            Ok(0)
        }
        Commands::Ask {
            question,
            dry_run: false
        } => {
            let session = open_session(&global, &config)?;
            let question = question.join(" ");
            let executed =
                answer_question(&session, &question, &opts, &mut io::stdout()).await?;
            Ok(if executed { 0 } else { 1 })
        }
        Commands::Repl => {
            let session = open_session(&global, &config)?;
            run_repl(&session, &opts).await?;
            Ok(0)
        }
    }
}

fn database_path(global: &GlobalArgs, config: &Config) -> AppResult<PathBuf> {
    global
        .database
        .clone()
        .or_else(|| config.database.path.clone())
        .ok_or_else(|| config_error("Database path required (use --database or PROMPTDB_DATABASE)"))
}

/// Schema from `--ddl` when given, otherwise from the database.
fn load_schema(global: &GlobalArgs, config: &Config) -> AppResult<Schema> {
    if let Some(ddl) = &global.ddl {
        let sql = read_to_string(ddl).map_err(|e| file_read_error(&ddl.display().to_string(), e))?;
        return Schema::from_ddl(&sql, SqlDialect::SQLite);
    }
    Database::open(database_path(global, config)?)?.fetch_schema()
}

fn open_session(global: &GlobalArgs, config: &Config) -> AppResult<Session<LlmClient>> {
    if global.ddl.is_some() {
        return Err(config_error(
            "--ddl only applies to `schema` and `ask --dry-run`; questions run against the database schema"
        ));
    }
    let database = Database::open(database_path(global, config)?)?;

    let provider = resolve_provider(global.provider, &config.llm)?;
    let model = get_effective_model(global.model.clone(), config.llm.model.clone(), &provider);
    let ollama_url =
        get_effective_ollama_url(global.ollama_url.clone(), config.llm.ollama_url.clone());
    let api_key = global.api_key.clone().or_else(|| config.llm.api_key.clone());
    let llm_provider = build_llm_provider(provider, api_key, model, ollama_url)?;

    let client = LlmClient::with_retry_config(llm_provider, config.retry.clone())
        .with_max_tokens(config.llm.max_tokens);
    Ok(Session::new(database, client))
}

fn paint(label: &str, colored: bool, ok: bool) -> String {
    match (colored, ok) {
        (false, _) => label.to_string(),
        (true, true) => label.green().bold().to_string(),
        (true, false) => label.red().bold().to_string()
    }
}
