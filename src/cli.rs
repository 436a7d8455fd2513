use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// promptdb - Ask a SQLite database questions in natural language
#[derive(Parser, Debug)]
#[command(name = "promptdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to SQLite database
    #[arg(short, long, global = true, env = "PROMPTDB_DATABASE")]
    pub database: Option<PathBuf>,

    /// Read the schema from a DDL file instead of the database
    #[arg(long, global = true)]
    pub ddl: Option<PathBuf>,

    /// LLM provider to use
    #[arg(short, long, global = true, value_enum)]
    pub provider: Option<Provider>,

    /// API key for OpenAI or Anthropic
    #[arg(short, long, global = true, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long, global = true)]
    pub ollama_url: Option<String>,

    /// Output format for query results
    #[arg(short = 'f', long, global = true, value_enum, default_value = "text")]
    pub output_format: Format,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level or filter directive (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session
    Repl,

    /// Ask a single question
    Ask {
        /// Question in natural language
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Print the prompt that would be sent to the LLM and exit
        #[arg(long)]
        dry_run: bool
    },

    /// Print the schema as it is sent to the LLM
    Schema,

    /// Check whether a SQL statement would be allowed to run
    Check {
        /// SQL statement (use - for stdin)
        sql: String
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }

    /// Parse a provider name from configuration.
    ///
    /// Accepts the CLI spelling (`open-ai`) as well as `openai`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" => Some(Self::OpenAI),
            "anthropic" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
