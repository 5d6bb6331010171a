use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::OracleError;
use crate::prompt::SYSTEM_PROMPT;

/// Anything that turns a prompt into raw completion text.
#[allow(async_fn_in_trait)]
pub trait ClassificationOracle {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleBackend {
    OpenAi,
    Ollama,
}

impl std::fmt::Display for OracleBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleBackend::OpenAi => f.write_str("openai"),
            OracleBackend::Ollama => f.write_str("ollama"),
        }
    }
}

impl std::str::FromStr for OracleBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(OracleBackend::OpenAi),
            "ollama" => Ok(OracleBackend::Ollama),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, OracleError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

// Status errors carry the body so auth and quota problems are readable in the log.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OracleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OracleError::Status {
        status: status.as_u16(),
        body,
    })
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Option<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OracleError::MissingApiKey(OracleBackend::OpenAi.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            temperature,
            client: http_client(timeout)?,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
        }
    }
}

impl ClassificationOracle for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let chat: ChatResponse = check_status(response).await?.json().await?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(OracleError::EmptyResponse)
    }
}

/// Ollama `/api/generate` client
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str, // "json" for structured output
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature,
            client: http_client(timeout)?,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.model,
            system: SYSTEM_PROMPT,
            prompt,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }
}

impl ClassificationOracle for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.request(prompt))
            .send()
            .await?;

        let ollama_response: OllamaResponse = check_status(response).await?.json().await?;

        let text = ollama_response.response.trim().to_string();
        if text.is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Backend chosen at startup
#[derive(Clone)]
pub enum OracleClient {
    OpenAi(OpenAiClient),
    Ollama(OllamaClient),
}

impl OracleClient {
    pub fn backend(&self) -> OracleBackend {
        match self {
            OracleClient::OpenAi(_) => OracleBackend::OpenAi,
            OracleClient::Ollama(_) => OracleBackend::Ollama,
        }
    }
}

impl ClassificationOracle for OracleClient {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        match self {
            OracleClient::OpenAi(client) => client.complete(prompt).await,
            OracleClient::Ollama(client) => client.complete(prompt).await,
        }
    }
}
