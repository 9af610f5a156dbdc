//! Relevance Classifier
//!
//! Scores a listing against the candidate's skill profile via the Groq
//! chat-completions API, constraining the response to a JSON object with
//! exactly the three judgment fields.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::models::judgment::Judgment;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Low temperature for deterministic scoring.
const TEMPERATURE: f32 = 0.1;

/// Error type for classifier operations. The pipeline converts these to
/// the sentinel judgment; they never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("HTTP request to model endpoint failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {0}")]
    Api(StatusCode),

    #[error("model response contained no choices")]
    EmptyResponse,

    #[error("failed to parse model output as a judgment: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, title: &str, description: &str)
        -> Result<Judgment, ClassifierError>;
}

/// Client for the Groq structured-output chat-completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    skill_profile: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl GroqClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        skill_profile: impl Into<String>,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            skill_profile: skill_profile.into(),
        })
    }

    /// Point the client at a different API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are an expert technical recruiter evaluating jobs for a Data/AI Engineer. \
             The candidate's core skills are: {}.\n\n\
             You MUST output ONLY a valid JSON object with exactly these keys:\n\
             - \"score\": integer (1-10) on how well it matches the candidate's skills.\n\
             - \"summary\": A very brief, one-sentence summary of the role.\n\
             - \"is_agency\": boolean (true if it seems to be a recruiting agency, false if direct client).",
            self.skill_profile
        )
    }
}

#[async_trait]
impl Classifier for GroqClient {
    async fn classify(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Judgment, ClassifierError> {
        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": self.system_prompt()},
                {"role": "user", "content": format!("Job Title: {title}\nJob Details: {description}")},
            ],
            "temperature": TEMPERATURE,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Api(response.status()));
        }

        let chat: ChatResponse = response.json().await?;
        let choice = chat.choices.first().ok_or(ClassifierError::EmptyResponse)?;

        let judgment: Judgment = serde_json::from_str(&choice.message.content)?;
        Ok(judgment)
    }
}
