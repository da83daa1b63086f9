use tracing::instrument;

pub mod chat;

use color_eyre::{eyre::Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    #[instrument(name = "OpenAiConfig::from_env")]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").wrap_err("No OpenAI API KEY Found")?;

        Ok(Self {
            api_key,
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
