//! Gemini REST client implementing the generative-language boundary.

use std::{collections::HashMap, fs};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::domain::Strategy;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{Conversation, GenerativeProvider, SamplingParams};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Resolution order: built-in defaults, then `tutor_ally.toml` in the working
/// directory, then environment variables.
pub fn load_settings() -> GeminiSettings {
    let mut settings = GeminiSettings::default();

    if let Ok(raw) = fs::read_to_string("tutor_ally.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("gemini_api_key") {
                settings.api_key = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("gemini_model") {
                settings.model = v.clone();
            }
            if let Some(v) = file_cfg.get("gemini_api_base_url") {
                settings.api_base_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("GEMINI_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Ok(v) = std::env::var("APP__GEMINI_API_KEY") {
        settings.api_key = Some(v);
    }

    if let Ok(v) = std::env::var("GEMINI_MODEL") {
        settings.model = v;
    }
    if let Ok(v) = std::env::var("APP__GEMINI_MODEL") {
        settings.model = v;
    }

    if let Ok(v) = std::env::var("GEMINI_API_BASE_URL") {
        settings.api_base_url = v;
    }

    settings
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("no Gemini API key configured; set GEMINI_API_KEY")]
    MissingApiKey,
    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Gemini returned no candidate text")]
    EmptyResponse,
    #[error("failed to decode structured Gemini output: {0}")]
    MalformedStructuredOutput(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<&'a Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn candidate_text(response: GenerateContentResponse) -> Result<String, GeminiError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| {
            candidate
                .content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err(GeminiError::EmptyResponse);
    }
    Ok(text)
}

fn sampling_config(sampling: SamplingParams) -> Value {
    json!({
        "temperature": sampling.temperature,
        "topK": sampling.top_k,
        "topP": sampling.top_p,
    })
}

fn strategy_schema(count: usize) -> Value {
    json!({
        "type": "ARRAY",
        "minItems": count,
        "maxItems": count,
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "description": { "type": "STRING" },
                "category": { "type": "STRING" },
            },
            "required": ["title", "description", "category"],
        },
    })
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> Result<Self, GeminiError> {
        if settings.api_key.as_deref().unwrap_or("").trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }
        Ok(Self {
            http: Client::new(),
            settings,
        })
    }

    async fn generate(
        &self,
        contents: &[Content],
        system_instruction: Option<&Content>,
        generation_config: Option<Value>,
    ) -> Result<String, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.api_base_url, self.settings.model
        );
        let api_key = self.settings.api_key.as_deref().unwrap_or_default();
        let response: GenerateContentResponse = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(&GenerateContentRequest {
                contents,
                system_instruction,
                generation_config,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        candidate_text(response)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_text(&self, prompt: &str, sampling: SamplingParams) -> Result<String> {
        let contents = [Content::user(prompt)];
        let text = self
            .generate(&contents, None, Some(sampling_config(sampling)))
            .await?;
        Ok(text)
    }

    async fn start_conversation(&self, system_directive: &str) -> Result<Box<dyn Conversation>> {
        Ok(Box::new(GeminiConversation {
            provider: self.clone(),
            system: Content::system(system_directive),
            history: Mutex::new(Vec::new()),
        }))
    }

    async fn generate_strategies(&self, prompt: &str, count: usize) -> Result<Vec<Strategy>> {
        let contents = [Content::user(prompt)];
        let config = json!({
            "responseMimeType": "application/json",
            "responseSchema": strategy_schema(count),
        });
        let text = self.generate(&contents, None, Some(config)).await?;
        let strategies: Vec<Strategy> =
            serde_json::from_str(&text).map_err(GeminiError::MalformedStructuredOutput)?;
        Ok(strategies)
    }
}

/// Conversation handle replaying the full history plus the fixed system
/// directive on every turn. Exclusively owned by one simulation session.
struct GeminiConversation {
    provider: GeminiProvider,
    system: Content,
    history: Mutex<Vec<Content>>,
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send_turn(&self, text: &str) -> Result<String> {
        let mut history = self.history.lock().await;
        history.push(Content::user(text));
        match self
            .provider
            .generate(&history, Some(&self.system), None)
            .await
        {
            Ok(reply) => {
                history.push(Content::model(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                // Keep provider-side history consistent with what the model
                // actually acknowledged; the UI transcript keeps its own
                // optimistic copy of the tutor turn.
                history.pop();
                Err(err.into())
            }
        }
    }
}
