pub(crate) mod generator;
pub(crate) mod judge;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub speaker: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub original_phrase: String,
    // Surface form may differ from original_phrase.
    pub phrase: String,
    pub japanese_explanation: String,
    pub nuance: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub conversation: String,
    pub phrase: String,
    pub correction_result: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The only class the session loop recovers from (by drawing a new phrase).
    #[error("model output failed validation: {0}")]
    Validation(String),
    #[error("Anthropic API request failed")]
    Transport(#[from] reqwest::Error),
    #[error("no content in Anthropic response")]
    EmptyResponse,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn complete(
        &self,
        model: &str,
        temperature: f32,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model,
            max_tokens: 4096,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let response: MessagesResponse = response.json().await?;
        let text = response
            .content
            .first()
            .ok_or(LlmError::EmptyResponse)?
            .text
            .clone();
        Ok(text)
    }
}

// Strips an optional json code fence and parses the remainder. Parse
// failures are the retryable validation class.
fn parse_structured<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json_text = text
        .trim()
        .trim_start_matches("```json")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(json_text).map_err(|error| {
        LlmError::Validation(format!("{error}; model returned: `{json_text}`"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let feedback: Feedback = parse_structured(
            r#"{"conversation": "A: <?>", "phrase": "break the ice", "correction_result": "自然な表現です。"}"#,
        )
        .unwrap();
        assert_eq!(feedback.phrase, "break the ice");
        assert!(feedback.examples.is_empty());
    }

    #[test]
    fn strips_json_fences() {
        let text = "```json\n{\"conversation\": \"c\", \"phrase\": \"p\", \"correction_result\": \"r\", \"examples\": [\"e\"]}\n```";
        let feedback: Feedback = parse_structured(text).unwrap();
        assert_eq!(feedback.examples, vec!["e"]);
    }

    #[test]
    fn malformed_output_is_a_validation_error() {
        let error = parse_structured::<Feedback>("Sure! Here is the feedback you asked for.")
            .unwrap_err();
        assert!(matches!(error, LlmError::Validation(_)));
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let error =
            parse_structured::<Conversation>(r#"{"phrase": "break the ice"}"#).unwrap_err();
        assert!(matches!(error, LlmError::Validation(_)));
    }
}
