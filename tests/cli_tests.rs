// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use clap::Parser;
use promptdb::cli::{Cli, Commands, Format, Provider};

#[test]
fn test_provider_default_model_openai() {
    assert_eq!(Provider::OpenAI.default_model(), "gpt-4");
}

#[test]
fn test_provider_default_model_anthropic() {
    assert_eq!(Provider::Anthropic.default_model(), "claude-sonnet-4-20250514");
}

#[test]
fn test_provider_default_model_ollama() {
    assert_eq!(Provider::Ollama.default_model(), "llama3.2");
}

#[test]
fn test_provider_from_name() {
    assert_eq!(Provider::from_name("openai"), Some(Provider::OpenAI));
    assert_eq!(Provider::from_name("open-ai"), Some(Provider::OpenAI));
    assert_eq!(Provider::from_name(" Anthropic "), Some(Provider::Anthropic));
    assert_eq!(Provider::from_name("OLLAMA"), Some(Provider::Ollama));
    assert_eq!(Provider::from_name("gemini"), None);
}

#[test]
fn test_parse_ask_joins_words() {
    let cli = Cli::try_parse_from(["promptdb", "-d", "shop.db", "ask", "how", "many", "users"])
        .unwrap();
    match cli.command {
        Commands::Ask {
            question,
            dry_run
        } => {
            assert_eq!(question.join(" "), "how many users");
            assert!(!dry_run);
        }
        other => panic!("unexpected command: {:?}", other)
    }
    assert_eq!(
        cli.global.database.as_deref(),
        Some(std::path::Path::new("shop.db"))
    );
}

#[test]
fn test_parse_ask_requires_question() {
    assert!(Cli::try_parse_from(["promptdb", "ask"]).is_err());
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "promptdb",
        "ask",
        "--dry-run",
        "--provider",
        "ollama",
        "-f",
        "json",
        "--no-color",
        "top",
        "customers"
    ])
    .unwrap();
    assert_eq!(cli.global.provider, Some(Provider::Ollama));
    assert!(matches!(cli.global.output_format, Format::Json));
    assert!(cli.global.no_color);
    assert!(matches!(cli.command, Commands::Ask { dry_run: true, .. }));
}

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["promptdb", "check", "SELECT 1"]).unwrap();
    assert!(matches!(cli.command, Commands::Check { ref sql } if sql == "SELECT 1"));
}

#[test]
fn test_parse_repl_and_schema() {
    assert!(matches!(
        Cli::try_parse_from(["promptdb", "repl"]).unwrap().command,
        Commands::Repl
    ));
    assert!(matches!(
        Cli::try_parse_from(["promptdb", "schema", "--ddl", "schema.sql"])
            .unwrap()
            .command,
        Commands::Schema
    ));
}

#[test]
fn test_default_output_format_is_text() {
    let cli = Cli::try_parse_from(["promptdb", "repl"]).unwrap();
    assert!(matches!(cli.global.output_format, Format::Text));
}

#[test]
fn test_invalid_provider_rejected() {
    assert!(Cli::try_parse_from(["promptdb", "--provider", "gemini", "repl"]).is_err());
}
