use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::web::models::Message;

/// Sampling options forwarded verbatim to the inference backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The single capability the web layer needs from an inference backend.
///
/// Handlers take this as a trait object so tests can substitute a stub
/// without a running model server.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, messages: &[Message], options: GenerateOptions) -> Result<String>;
}

// Request/response shapes for Ollama's /api/chat endpoint.

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    // Ollama's name for the maximum number of tokens to generate.
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatReply {
    message: OllamaChatMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// A client for the Ollama chat API.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaClient {
    /// Build a client from the environment.
    ///
    /// Reads `OLLAMA_URL` (default `http://localhost:11434`), `OLLAMA_MODEL`
    /// (default `llama3.2`) and `OLLAMA_TIMEOUT_SECS`. Without the timeout
    /// variable the client waits on the backend indefinitely.
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        let timeout_secs = env::var("OLLAMA_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        info!("Using Ollama server at: {} (model: {})", base_url, model);

        Self::new(base_url, model, timeout_secs)
    }

    pub fn new(base_url: String, model: String, timeout_secs: Option<u64>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            model,
            client,
        })
    }

    async fn chat(&self, messages: &[Message], options: GenerateOptions) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let payload = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        debug!("Sending {} message(s) to {}", messages.len(), url);

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Ollama request failed ({}): {}", status, error_text));
        }

        let reply: OllamaChatReply = response
            .json()
            .await
            .context("Failed to extract message content from Ollama response")?;

        Ok(reply.message.content)
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn generate(&self, messages: &[Message], options: GenerateOptions) -> Result<String> {
        info!(
            "Generating response ({} message(s), temperature: {}, max_tokens: {})",
            messages.len(),
            options.temperature,
            options.max_tokens
        );

        match self.chat(messages, options).await {
            Ok(content) => {
                info!("Response length: {} characters", content.len());
                Ok(content)
            }
            Err(e) => {
                error!("Error generating response: {:#}", e);
                Err(e)
            }
        }
    }
}
