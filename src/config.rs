//! Settings file loading.
//!
//! The optional YAML file carries two sections, `keywords` and `llm`. Both
//! are read once at start-up; command-line flags override individual `llm`
//! values afterwards.
//!
//! ```yaml
//! keywords:
//!   - chart: bar chart
//!     phrases: [categories, comparison, bar chart]
//! llm:
//!   host: http://localhost:11434
//!   model: llama3.2
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::keywords::KeywordTable;

pub const DEFAULT_LLM_HOST: &str = "http://localhost:11434";
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    pub enabled: bool,
    pub host: String,
    pub model: String,
    pub max_new_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: DEFAULT_LLM_HOST.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub keywords: KeywordTable,
    pub llm: LlmSettings,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening settings file {path:?}"))?;
        Self::from_yaml(&raw).with_context(|| format!("Parsing settings file {path:?}"))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
