//! LLM-backed skill suggestion client.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint using [`reqwest`].
//! The client is constructed once at startup from environment variables and
//! injected into [`crate::state::AppState`] as `Option<Arc<SuggestionClient>>`;
//! when the variables are absent the feature is off and handlers return a
//! typed 503 instead of probing a global.

use serde::Deserialize;

/// Default chat-completions endpoint.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when `SUGGESTION_MODEL` is unset.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Maximum number of skill names returned per suggestion.
const MAX_SUGGESTIONS: usize = 8;

/// HTTP client for the skill-suggestion endpoint.
pub struct SuggestionClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

/// Errors from the suggestion API layer.
#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Suggestion API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The provider response did not contain usable content.
    #[error("Malformed suggestion response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl SuggestionClient {
    /// Build the client from environment variables.
    ///
    /// Returns `None` (feature disabled) when `SUGGESTION_API_KEY` is unset.
    ///
    /// | Env Var               | Required | Default                      |
    /// |-----------------------|----------|------------------------------|
    /// | `SUGGESTION_API_KEY`  | **yes**  | -- (unset disables feature)  |
    /// | `SUGGESTION_API_URL`  | no       | OpenAI chat completions      |
    /// | `SUGGESTION_MODEL`    | no       | `gpt-4o-mini`                |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("SUGGESTION_API_KEY").ok()?;
        let api_url =
            std::env::var("SUGGESTION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("SUGGESTION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Some(Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        })
    }

    /// Suggest skill names for a quest or team description.
    ///
    /// Returns a deduplicated list of lowercase skill names, at most
    /// [`MAX_SUGGESTIONS`] entries.
    pub async fn suggest_skills(&self, description: &str) -> Result<Vec<String>, SuggestionError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "List the professional skills needed for the task described \
                                by the user. Reply with one lowercase skill name per line, \
                                nothing else."
                },
                { "role": "user", "content": description }
            ],
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| SuggestionError::Malformed("response contained no choices".into()))?;

        Ok(parse_skill_lines(content))
    }
}

/// Parse one-skill-per-line model output into a clean, deduplicated list.
fn parse_skill_lines(content: &str) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    let mut skills = Vec::new();

    for line in content.lines() {
        let name = line
            .trim()
            .trim_start_matches(['-', '*', ' '])
            .trim()
            .to_lowercase();
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        skills.push(name);
        if skills.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    skills
}
