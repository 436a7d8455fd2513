//! # promptdb
//!
//! Natural-language questions to SQL, with a read-only guard in front of the
//! database.
//!
//! - [`guard`] - lexical read-only check for generated SQL
//! - [`cache`] - whole-database schema cache
//! - [`schema`] - schema representation and prompt rendering
//! - [`db`] - SQLite schema discovery and execution
//! - [`llm`] - LLM provider integrations (OpenAI, Anthropic, Ollama)
//! - [`app`] - session orchestration
//! - [`repl`] - interactive loop
//! - [`output`] - result formatting
//! - [`config`] - configuration loading
//! - [`logging`] - tracing subscriber setup
//! - [`error`] - error types and constructors

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod llm;
pub mod logging;
pub mod output;
pub mod repl;
pub mod schema;
