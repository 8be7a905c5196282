//! Natural-language-to-command suggestion source.
//!
//! The mediation flow treats the suggestion source as a black box: hand it a
//! free-text query, get back a command string and a one-sentence explanation,
//! or an error. The production implementation asks the Claude API for a
//! reply in a fixed two-line `COMMAND:` / `EXPLANATION:` format and parses it
//! defensively; anything ambiguous (duplicated markers, missing command) is
//! an error rather than a guess. A missing explanation is tolerated.

use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// Marker the model must put in front of the suggested command.
pub const COMMAND_PREFIX: &str = "COMMAND:";
/// Marker the model must put in front of the explanation.
pub const EXPLANATION_PREFIX: &str = "EXPLANATION:";

const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// A suggested shell command and its explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub command: String,
    pub explanation: String,
}

/// Source of command suggestions for natural-language queries.
#[async_trait]
pub trait CommandSuggester: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Suggestion>;
}

/// Builds the suggester the configuration asks for.
///
/// Mock mode short-circuits to the deterministic [`MockSuggester`];
/// otherwise an API key is required.
pub fn suggester_from_config(config: &Config) -> Result<Box<dyn CommandSuggester>> {
    if config.is_mock_mode() {
        info!("Using mock suggester (VOLITION_USE_MOCK=1)");
        return Ok(Box::new(MockSuggester));
    }

    match config.get_api_key() {
        Some(api_key) => Ok(Box::new(LlmSuggester::new(api_key.clone()))),
        None => Err(anyhow!(
            "No Anthropic API key found. Please set it using one of these methods:\n\
             \n\
             1. Set API key in config:\n\
                fiat --set-api-key sk-ant-your-key-here\n\
             \n\
             2. Set environment variable:\n\
                export ANTHROPIC_API_KEY=sk-ant-your-key-here\n\
             \n\
             3. Check current config:\n\
                fiat --config\n\
             \n\
             Get your API key from: https://console.anthropic.com"
        )),
    }
}

// =============================================================================
// HTTP abstraction
// =============================================================================

/// Trait for HTTP communication with the suggestion API.
///
/// Allows injecting mock clients so suggester tests never touch the network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body and returns the response text.
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String>;
}

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<String> {
        let mut request = self.client.post(url);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }
        let response = request.json(body).send().await?;
        Ok(response.text().await?)
    }
}

// =============================================================================
// Production suggester
// =============================================================================

/// Suggester backed by the Claude API.
pub struct LlmSuggester {
    http: Box<dyn HttpClient>,
    api_key: String,
}

impl LlmSuggester {
    pub fn new(api_key: String) -> Self {
        Self::with_http_client(api_key, Box::new(ReqwestHttpClient::new()))
    }

    /// Creates a suggester with a custom HTTP client (for testing).
    pub fn with_http_client(api_key: String, http: Box<dyn HttpClient>) -> Self {
        Self { http, api_key }
    }

    fn build_prompt(query: &str) -> String {
        format!(
            "You are a helpful Linux assistant.\n\
             Translate the following natural language instruction into a safe Linux command.\n\
             Then explain what the command does in one sentence.\n\
             \n\
             Instruction: {query}\n\
             \n\
             Format your reply exactly like:\n\
             {COMMAND_PREFIX} <command>\n\
             {EXPLANATION_PREFIX} <what it does>"
        )
    }
}

#[async_trait]
impl CommandSuggester for LlmSuggester {
    async fn suggest(&self, query: &str) -> Result<Suggestion> {
        info!("Requesting command suggestion for: {}", query);

        let request_body = json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 300,
            "messages": [
                {
                    "role": "user",
                    "content": Self::build_prompt(query)
                }
            ]
        });

        let response_text = self
            .http
            .post_json(
                API_URL,
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("content-type", "application/json"),
                    ("anthropic-version", "2023-06-01"),
                ],
                &request_body,
            )
            .await
            .context("suggestion request failed")?;

        let response: serde_json::Value = serde_json::from_str(&response_text)
            .with_context(|| format!("suggestion reply was not JSON: {response_text}"))?;

        let content = response
            .get("content")
            .and_then(|content| content.as_array())
            .and_then(|blocks| blocks.first())
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .ok_or_else(|| anyhow!("suggestion reply had no text content: {response_text}"))?;

        parse_reply(content)
    }
}

/// Parses the two-line reply format into a [`Suggestion`].
///
/// Lines without a recognized marker are ignored (models like to add
/// chatter). A duplicated marker or a missing/empty command is an error; a
/// missing explanation yields an empty string.
pub fn parse_reply(text: &str) -> Result<Suggestion> {
    let mut command: Option<String> = None;
    let mut explanation: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(COMMAND_PREFIX) {
            if command.is_some() {
                return Err(anyhow!(
                    "ambiguous suggestion: more than one '{COMMAND_PREFIX}' line"
                ));
            }
            command = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix(EXPLANATION_PREFIX) {
            if explanation.is_some() {
                return Err(anyhow!(
                    "ambiguous suggestion: more than one '{EXPLANATION_PREFIX}' line"
                ));
            }
            explanation = Some(rest.trim().to_string());
        }
    }

    match command {
        Some(command) if !command.is_empty() => Ok(Suggestion {
            command,
            explanation: explanation.unwrap_or_default(),
        }),
        _ => Err(anyhow!("no command found in suggestion reply:\n{text}")),
    }
}

// =============================================================================
// Mock suggester
// =============================================================================

/// Deterministic suggester for mock mode and tests.
pub struct MockSuggester;

#[async_trait]
impl CommandSuggester for MockSuggester {
    async fn suggest(&self, query: &str) -> Result<Suggestion> {
        let lowered = query.to_lowercase();
        let (command, explanation) = if lowered.contains("disk") {
            ("df -h", "Shows disk usage for every mounted filesystem.")
        } else if lowered.contains("memory") {
            ("free -m", "Shows total, used and free memory in megabytes.")
        } else if lowered.contains("list") && lowered.contains("file") {
            ("ls -la", "Lists all files in the current directory with details.")
        } else if lowered.contains("restart") && lowered.contains("nginx") {
            ("systemctl restart nginx", "Restarts the nginx service.")
        } else if lowered.contains("kernel") {
            ("uname -r", "Prints the running kernel release.")
        } else {
            ("echo 'fiat mock suggestion'", "Prints a placeholder line.")
        };

        Ok(Suggestion {
            command: command.to_string(),
            explanation: explanation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_with_both_fields() {
        let suggestion = parse_reply("COMMAND: ls -la\nEXPLANATION: Lists files.").unwrap();
        assert_eq!(suggestion.command, "ls -la");
        assert_eq!(suggestion.explanation, "Lists files.");
    }

    #[test]
    fn test_parse_reply_tolerates_missing_explanation() {
        let suggestion = parse_reply("COMMAND: uptime").unwrap();
        assert_eq!(suggestion.command, "uptime");
        assert_eq!(suggestion.explanation, "");
    }

    #[test]
    fn test_parse_reply_ignores_surrounding_chatter() {
        let text = "Sure! Here you go:\nCOMMAND: date\nEXPLANATION: Prints the date.\nEnjoy!";
        let suggestion = parse_reply(text).unwrap();
        assert_eq!(suggestion.command, "date");
    }

    #[test]
    fn test_parse_reply_missing_command_is_an_error() {
        assert!(parse_reply("EXPLANATION: no command here").is_err());
    }

    #[test]
    fn test_parse_reply_empty_command_is_an_error() {
        assert!(parse_reply("COMMAND:\nEXPLANATION: nothing").is_err());
    }

    #[test]
    fn test_parse_reply_duplicate_command_marker_is_an_error() {
        let text = "COMMAND: ls\nCOMMAND: pwd\nEXPLANATION: which one?";
        assert!(parse_reply(text).is_err());
    }

    #[test]
    fn test_parse_reply_duplicate_explanation_marker_is_an_error() {
        let text = "COMMAND: ls\nEXPLANATION: one\nEXPLANATION: two";
        assert!(parse_reply(text).is_err());
    }

    /// Mock HTTP client returning a canned response body.
    struct MockHttpClient {
        response: String,
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn post_json(
            &self,
            _url: &str,
            _headers: &[(&str, &str)],
            _body: &serde_json::Value,
        ) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_llm_suggester_extracts_text_block_and_parses_it() {
        let api_reply = json!({
            "content": [
                { "type": "text", "text": "COMMAND: df -h\nEXPLANATION: Shows disk usage." }
            ]
        })
        .to_string();
        let suggester = LlmSuggester::with_http_client(
            "test-key".to_string(),
            Box::new(MockHttpClient {
                response: api_reply,
            }),
        );

        let suggestion = suggester.suggest("how full are my disks").await.unwrap();
        assert_eq!(suggestion.command, "df -h");
        assert_eq!(suggestion.explanation, "Shows disk usage.");
    }

    #[tokio::test]
    async fn test_llm_suggester_rejects_reply_without_content() {
        let suggester = LlmSuggester::with_http_client(
            "test-key".to_string(),
            Box::new(MockHttpClient {
                response: json!({ "error": { "message": "overloaded" } }).to_string(),
            }),
        );

        assert!(suggester.suggest("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_suggester_flags_service_restart_queries() {
        let suggestion = MockSuggester.suggest("restart nginx please").await.unwrap();
        assert_eq!(suggestion.command, "systemctl restart nginx");
    }

    #[tokio::test]
    async fn test_mock_suggester_has_a_fallback() {
        let suggestion = MockSuggester.suggest("do something odd").await.unwrap();
        assert!(!suggestion.command.is_empty());
        assert!(!suggestion.explanation.is_empty());
    }
}
