// openai.rs — OpenAI-compatible chat-completions judge.
//
// Works against api.openai.com or any server speaking the same protocol
// (vLLM, Ollama, LocalAI). Both operations request `json_object` output and
// hand the parsed JSON to `normalize` before anything reaches the caller.

use std::time::Duration;

use async_trait::async_trait;
use pod_goal::{QuestionPair, Verdict};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JudgeError;
use crate::judge::Judge;
use crate::normalize;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const QUESTIONS_PROMPT: &str = "You write exactly TWO short verification questions for a goal. \
Be specific to the goal/scope. Return ONLY JSON: {\"questions\":[\"q1\",\"q2\"]}.";

const GRADE_PROMPT: &str = "You decide PASS or FAIL for one question/answer pair about a goal. \
Default to PASS unless the answer is empty, off-topic, or nonsense. \
Return ONLY JSON: {\"verdict\":\"PASS\"} or {\"verdict\":\"FAIL\"}.";

/// Judge backed by an OpenAI-compatible API.
pub struct OpenAiJudge {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl OpenAiJudge {
    /// Create a judge for the given endpoint and model.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, JudgeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Send one system+user exchange and parse the reply content as JSON.
    async fn chat_json(&self, system: &str, user: &str) -> Result<Value, JudgeError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.2,
        };

        let response = self
            .authorize(self.client.post(self.chat_completions_url()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(JudgeError::RequestFailed(format!("{}: {}", status, text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| JudgeError::Parse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| JudgeError::Parse("no message content".to_string()))?;

        serde_json::from_str(&content).map_err(|e| JudgeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Judge for OpenAiJudge {
    fn name(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let request = self.authorize(self.client.get(format!("{}/models", self.base_url)));
        request
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn generate_questions(
        &self,
        title: &str,
        scope: Option<&str>,
    ) -> Result<QuestionPair, JudgeError> {
        let user = format!(
            "GOAL_TITLE: {}\nGOAL_SCOPE: {}\nWrite two questions.",
            title,
            scope.unwrap_or("(none)")
        );
        let reply = self.chat_json(QUESTIONS_PROMPT, &user).await?;
        match normalize::questions_from_value(&reply) {
            Some(pair) => Ok(pair),
            None => {
                tracing::warn!(model = %self.model, "judge returned fewer than two questions, using fallback");
                Ok(normalize::fallback_questions(title, scope))
            }
        }
    }

    async fn grade(
        &self,
        title: &str,
        scope: Option<&str>,
        question: &str,
        answer: &str,
    ) -> Result<Verdict, JudgeError> {
        if answer.trim().is_empty() {
            return Ok(Verdict::Fail);
        }
        let user = serde_json::json!({
            "title": title,
            "scope": scope,
            "question": question,
            "answer": answer,
        })
        .to_string();
        let reply = self.chat_json(GRADE_PROMPT, &user).await?;
        normalize::verdict_from_value(&reply)
            .ok_or_else(|| JudgeError::Parse(format!("no verdict in reply: {}", reply)))
    }
}
