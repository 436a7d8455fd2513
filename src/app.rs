//! Question-to-results orchestration.
//!
//! A [`Session`] ties the collaborators together for one user:
//!
//! ```text
//! question -> SchemaCache::get(fetch) -> prompt -> Completion -> SQL
//!          -> guard::check -> Database::execute | reject
//! ```
//!
//! SQL that fails the read-only check never reaches the database.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    cache::SchemaCache,
    cli::Provider,
    config::{DEFAULT_OLLAMA_URL, LlmConfig},
    db::{Database, ResultSet},
    error::{AppResult, config_error},
    guard::{self, Verdict},
    llm::{Completion, LlmProvider, build_prompt, extract_sql},
    schema::Schema
};

/// What happened to a question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Generated SQL passed the guard and ran
    Executed {
        sql:     String,
        results: ResultSet
    },
    /// Generated SQL was refused; nothing was executed
    Rejected {
        sql:     String,
        verdict: Verdict
    }
}

impl Answer {
    pub fn sql(&self) -> &str {
        match self {
            Self::Executed {
                sql, ..
            }
            | Self::Rejected {
                sql, ..
            } => sql
        }
    }
}

/// One user's connection, model and schema cache.
pub struct Session<C> {
    database:   Database,
    completion: C,
    cache:      SchemaCache
}

impl<C: Completion> Session<C> {
    pub fn new(database: Database, completion: C) -> Self {
        Self {
            database,
            completion,
            cache: SchemaCache::new()
        }
    }

    /// Schema of the connected database, served from cache when possible
    pub fn schema(&self) -> AppResult<Arc<Schema>> {
        self.cache.get(|| self.database.fetch_schema())
    }

    /// Forget the cached schema; the next question fetches it again.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Prompt that would be sent to the model for `question`
    pub fn prompt(&self, question: &str) -> AppResult<String> {
        let schema = self.schema()?;
        Ok(build_prompt(&schema.to_prompt(), question))
    }

    /// Ask the model for SQL answering `question`.
    pub async fn generate(&self, question: &str) -> AppResult<String> {
        let prompt = self.prompt(question)?;
        debug!(%prompt, "Built prompt");
        let completion = self.completion.complete(&prompt).await?;
        Ok(extract_sql(&completion))
    }

    /// Generate SQL for `question` and run it if it is read-only.
    pub async fn ask(&self, question: &str) -> AppResult<Answer> {
        let sql = self.generate(question).await?;
        self.run(sql)
    }

    /// Run `sql` through the guard, executing it only when accepted.
    pub fn run(&self, sql: String) -> AppResult<Answer> {
        let verdict = guard::check(&sql);
        if !verdict.is_read_only() {
            warn!(%sql, %verdict, "Refusing to execute generated SQL");
            return Ok(Answer::Rejected {
                sql,
                verdict
            });
        }
        let results = self.database.execute(&sql)?;
        info!(rows = results.rows.len(), "Query executed");
        Ok(Answer::Executed {
            sql,
            results
        })
    }
}

/// Pick the provider: command line first, then config, then OpenAI.
pub fn resolve_provider(cli: Option<Provider>, config: &LlmConfig) -> AppResult<Provider> {
    if let Some(provider) = cli {
        return Ok(provider);
    }
    match config.provider.as_deref() {
        Some(name) => Provider::from_name(name)
            .ok_or_else(|| config_error(format!("Unknown LLM provider '{}'", name))),
        None => Ok(Provider::OpenAI)
    }
}

/// Get effective model name
pub fn get_effective_model(
    model: Option<String>,
    config_model: Option<String>,
    provider: &Provider
) -> String {
    model
        .or(config_model)
        .unwrap_or_else(|| provider.default_model().to_string())
}

/// Get effective Ollama URL
pub fn get_effective_ollama_url(url: Option<String>, config_url: Option<String>) -> String {
    url.or(config_url)
        .unwrap_or_else(|| String::from(DEFAULT_OLLAMA_URL))
}

/// Build LLM provider from parameters
pub fn build_llm_provider(
    provider: Provider,
    api_key: Option<String>,
    model: String,
    ollama_url: String
) -> AppResult<LlmProvider> {
    match provider {
        Provider::OpenAI => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::OpenAI {
                api_key: key,
                model
            })
        }
        Provider::Anthropic => {
            let key = api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::Anthropic {
                api_key: key,
                model
            })
        }
        Provider::Ollama => Ok(LlmProvider::Ollama {
            base_url: ollama_url,
            model
        })
    }
}
