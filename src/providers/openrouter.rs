use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::ProviderConfig;
use crate::errors::{AppError, ProviderError};
use crate::providers::TranslationProvider;
use crate::providers::response::parse_translation_response;
use crate::translation::models::TranslationResult;

/// Provider name used for logging and cache partitioning
pub const PROVIDER_NAME: &str = "openrouter";

/// Public API base URL
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-lite-001";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REFERER: &str = "https://github.com/OpenRouterTeam/openrouter";
const APP_TITLE: &str = "Russian-Anki-Translator";

/// Instruction prompt; `{target_language}` is replaced at construction
pub const DEFAULT_SYSTEM_PROMPT: &str = concat!(
    "You are a professional Russian-to-{target_language} translator. ",
    "Translate the given Russian word into {target_language}. ",
    "When providing Russian examples use stresses over the characters which indicate the stress position of the word.\n",
    "You MUST respond ONLY with a valid JSON object in the following format, and nothing else. ",
    "Do not include any extra text or explanations before or after the JSON. Ensure the JSON is well-formed.\n",
    "Example JSON Response:\n",
    r#"{"translation": "dein", "part_of_speech": "Possessivpronomen", "#,
    r#""grammatical_case": "Nominativ, Genitiv, Dativ, Akkusativ (abhängig von Fall, Geschlecht und Numerus des Bezugswortes)", "#,
    r#""example_source_language": "Э́то твой кот.", "example_target_language": "Das ist deine Katze."}"#,
);

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response envelope
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Generated choices, the first one is used
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One generated choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// The assistant message
    pub message: ChatMessage,
}

impl ChatCompletionRequest {
    /// Create a new request for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// OpenRouter client translating single words
pub struct OpenRouter {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Model identifier
    model: String,
    /// Rendered system prompt
    system_prompt: String,
    /// Per-request timeout in seconds
    timeout_secs: u64,
}

impl std::fmt::Debug for OpenRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouter")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Fill the target language into a prompt template
pub fn render_system_prompt(template: &str, target_language: &str) -> String {
    template.replace("{target_language}", target_language)
}

impl OpenRouter {
    /// Create a new OpenRouter client
    ///
    /// Fails with a configuration error when `api_key` is empty.
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, AppError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "OpenRouter API key is missing; set it in the config or via OPENROUTER_API_KEY"
                    .to_string(),
            ));
        }

        let timeout_secs = if timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_secs
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = endpoint.into();
        let endpoint = if endpoint.trim().is_empty() {
            DEFAULT_ENDPOINT.to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        let model = model.into();
        let model = if model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            model
        };

        info!("OpenRouter translation provider initialized with model {}", model);

        Ok(Self {
            client,
            api_key,
            endpoint,
            model,
            system_prompt: render_system_prompt(DEFAULT_SYSTEM_PROMPT, "German"),
            timeout_secs,
        })
    }

    /// Create a client from a provider entry of the configuration
    pub fn from_config(
        config: &ProviderConfig,
        target_language: &str,
        system_prompt: Option<&str>,
    ) -> Result<Self, AppError> {
        let template = system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT);
        Ok(Self::new(
            config.resolved_api_key(),
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout_secs,
        )?
        .with_system_prompt(render_system_prompt(template, target_language)))
    }

    /// Replace the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// The configured model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The rendered system prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Build the request for `word`
    pub fn build_request(&self, word: &str) -> ChatCompletionRequest {
        ChatCompletionRequest::new(&self.model)
            .add_message("system", &self.system_prompt)
            .add_message("user", format!("Russian word: {}", word))
    }

    /// Send a chat completion request
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint);

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenRouter API error ({}): {}", status, error_text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::AuthenticationError(error_text)
                }
                _ => ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        serde_json::from_str::<ChatCompletionResponse>(&body)
            .map_err(|e| ProviderError::ParseError(format!("Invalid response envelope: {}", e)))
    }
}

#[async_trait]
impl TranslationProvider for OpenRouter {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn translate(&self, word: &str) -> Result<TranslationResult, ProviderError> {
        debug!("Translating '{}' using OpenRouter", word);

        let request = self.build_request(word);
        let response = self.complete(&request).await?;

        let content = response.first_content().ok_or_else(|| {
            ProviderError::ParseError("Response contained no message content".to_string())
        })?;

        Ok(parse_translation_response(word, content))
    }
}
