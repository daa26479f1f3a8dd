//! Text-generation collaborator used to suggest a chart for a query.
//!
//! The generated text is opaque: it is shown to the user and fed back into
//! keyword resolution, nothing more. Calls are blocking and never retried.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::LlmSettings;

pub trait SuggestionModel {
    fn generate(&self, prompt: &str) -> Result<String>;

    fn name(&self) -> String;
}

/// Prompt sent to the model, listing the dataset columns in Python list
/// notation.
pub fn build_prompt(columns: &[String], query: &str) -> String {
    let listed = columns
        .iter()
        .map(|column| format!("'{}'", column.replace('\'', "\\'")))
        .join(", ");
    format!(
        "Interpret the following query and suggest the appropriate graph, calculation, or operation. Dataset columns: [{listed}]. Query: {query}"
    )
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama `/api/generate` client.
pub struct OllamaModel {
    host: String,
    model: String,
    max_new_tokens: u32,
    client: reqwest::blocking::Client,
}

impl OllamaModel {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        // A zero timeout waits forever.
        builder = builder.timeout(
            (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs)),
        );
        let client = builder
            .build()
            .map_err(|e| anyhow!("failed to build http client: {e}"))?;
        Ok(Self {
            host: normalize_host(&settings.host),
            model: settings.model.clone(),
            max_new_tokens: settings.max_new_tokens,
            client,
        })
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

impl SuggestionModel for OllamaModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: self.max_new_tokens,
            },
        };
        debug!("Requesting suggestion from {url} with model {}", self.model);
        let response: GenerateResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .with_context(|| format!("failed to reach the model server at {url}"))?
            .error_for_status()
            .context("model server returned an error status")?
            .json()
            .context("model server returned invalid JSON")?;
        Ok(response.response)
    }

    fn name(&self) -> String {
        format!("{} via {}", self.model, self.host)
    }
}

/// Fixed reply, for offline runs and tests.
pub struct StaticModel {
    reply: Result<String, String>,
}

impl StaticModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
        }
    }
}

impl SuggestionModel for StaticModel {
    fn generate(&self, _prompt: &str) -> Result<String> {
        self.reply.clone().map_err(|message| anyhow!(message))
    }

    fn name(&self) -> String {
        "static".to_string()
    }
}
