use eyre::{Result, bail};
use log::debug;

use crate::insight::TextInsight;

const SYSTEM_PROMPT: &str = "You analyze YouTube videos and their audience. \
Answer exactly in the format the user asks for, without preamble.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    Gemini,
    OpenAi,
}

impl Provider {
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("claude") {
            Provider::Anthropic
        } else if model.starts_with("gemini") {
            Provider::Gemini
        } else {
            Provider::OpenAi
        }
    }
}

/// Hosted LLM as a [`TextInsight`] gateway; the provider is picked from the model name
pub struct LlmClient {
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(client: reqwest::Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 1024,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_anthropic(&self, prompt: &str) -> Result<String> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| eyre::eyre!("ANTHROPIC_API_KEY environment variable not set (required for Claude models)"))?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let resp = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Anthropic API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_anthropic_text(&json)
    }

    async fn generate_openai(&self, prompt: &str) -> Result<String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| eyre::eyre!("OPENAI_API_KEY environment variable not set (required for OpenAI models)"))?;

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let resp = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("OpenAI API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_openai_text(&json)
    }

    async fn generate_gemini(&self, prompt: &str) -> Result<String> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| eyre::eyre!("GEMINI_API_KEY environment variable not set (required for Gemini models)"))?;

        let body = serde_json::json!({
            "systemInstruction": {"parts": [{"text": SYSTEM_PROMPT}]},
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"maxOutputTokens": self.max_tokens}
        });

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json)
    }
}

impl TextInsight for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let provider = Provider::for_model(&self.model);
        debug!("Prompting {provider:?} model {} ({} chars)", self.model, prompt.len());
        match provider {
            Provider::Anthropic => self.generate_anthropic(prompt).await,
            Provider::Gemini => self.generate_gemini(prompt).await,
            Provider::OpenAi => self.generate_openai(prompt).await,
        }
    }
}

fn extract_anthropic_text(json: &serde_json::Value) -> Result<String> {
    if let Some(content) = json.get("content").and_then(|c| c.as_array()) {
        let text: String = content
            .iter()
            .filter_map(|block| {
                if block.get("type")?.as_str()? == "text" {
                    block.get("text")?.as_str().map(|s| s.to_string())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    bail!("unexpected Anthropic API response format");
}

fn extract_openai_text(json: &serde_json::Value) -> Result<String> {
    if let Some(text) = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
    {
        return Ok(text.to_string());
    }
    bail!("unexpected OpenAI API response format");
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());

    if let Some(parts) = parts {
        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text")?.as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    bail!("unexpected Gemini API response format");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_for_model() {
        assert_eq!(Provider::for_model("claude-sonnet-4-6"), Provider::Anthropic);
        assert_eq!(Provider::for_model("gemini-2.0-flash"), Provider::Gemini);
        assert_eq!(Provider::for_model("gpt-4o-mini"), Provider::OpenAi);
    }

    #[test]
    fn test_extract_anthropic_text() {
        let json = serde_json::json!({
            "content": [
                {"type": "text", "text": "joy"},
                {"type": "tool_use", "id": "x"}
            ]
        });
        assert_eq!(extract_anthropic_text(&json).unwrap(), "joy");
        assert!(extract_anthropic_text(&serde_json::json!({"content": []})).is_err());
    }

    #[test]
    fn test_extract_openai_text() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "rust, tokio"}}]
        });
        assert_eq!(extract_openai_text(&json).unwrap(), "rust, tokio");
        assert!(extract_openai_text(&serde_json::json!({"choices": []})).is_err());
    }

    #[test]
    fn test_extract_gemini_text() {
        let json = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "[{\"topic\": "}, {"text": "\"Rust\"}]"}]}}]
        });
        assert_eq!(extract_gemini_text(&json).unwrap(), "[{\"topic\": \"Rust\"}]");
        assert!(extract_gemini_text(&serde_json::json!({"candidates": []})).is_err());
        assert!(extract_gemini_text(&serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}})).is_err());
    }
}
