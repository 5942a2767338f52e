use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OpenAiConfig;

/// Reply used when no API credential is configured.
pub const NOT_CONNECTED_REPLY: &str = "I'm not connected to the support service right now, \
     but you can reach IMPEARL support at support@impearl.com.";

/// Reply used when the upstream call fails for any reason.
pub const UNREACHABLE_REPLY: &str = "I'm having trouble reaching IMPEARL support right now. \
     Please try again shortly or contact support@impearl.com.";

const PLATFORM_PROMPT: &str = "You are IMPEARL Support AI. Provide guidance only about how to \
     use the IMPEARL platform. If asked unrelated questions, politely redirect the user.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Optional personalization woven into the system prompt. Every field is
/// best-effort; an empty persona produces the bare platform prompt.
#[derive(Debug, Clone, Default)]
pub struct ChatPersona {
    pub display_name: Option<String>,
    pub role: Option<String>,
    pub focus: Option<String>,
    pub goals: Option<String>,
    pub skills: Vec<String>,
    pub matches: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("http error: {0}")]
    Http(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Proxy to the chat-completions upstream. Configured once at construction;
/// from the caller's perspective it always produces a reply.
#[derive(Clone)]
pub struct ChatService {
    http: Client,
    config: OpenAiConfig,
}

impl ChatService {
    pub fn new(config: OpenAiConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http, config }
    }

    /// Produce a support reply. Missing credential and upstream failure both
    /// degrade to canned replies; failure detail stays in the server log.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        persona: Option<&ChatPersona>,
        extras: Option<&str>,
    ) -> String {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return NOT_CONNECTED_REPLY.to_string();
        };

        match self.complete(api_key, messages, persona, extras).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!("Support chat upstream error: {}", err);
                UNREACHABLE_REPLY.to_string()
            }
        }
    }

    async fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        persona: Option<&ChatPersona>,
        extras: Option<&str>,
    ) -> Result<String, ChatError> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage {
            role: "system".to_string(),
            content: build_system_prompt(persona, extras),
        });
        conversation.extend(messages.iter().cloned());

        let body = CompletionRequest {
            model: &self.config.model,
            messages: &conversation,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ChatError::Http(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status().as_u16()));
        }

        let payload: CompletionResponse = response
            .json()
            .await
            .map_err(|err| ChatError::InvalidResponse(err.to_string()))?;

        Ok(payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

fn build_system_prompt(persona: Option<&ChatPersona>, extras: Option<&str>) -> String {
    let mut prompt = PLATFORM_PROMPT.to_string();

    if let Some(persona) = persona {
        let name = persona.display_name.as_deref().unwrap_or("the user");
        match persona.role.as_deref() {
            Some(role) => {
                prompt.push_str(&format!("\nYou are speaking with {}, a {} on the platform.", name, role));
            }
            None => prompt.push_str(&format!("\nYou are speaking with {}.", name)),
        }
        if let Some(focus) = persona.focus.as_deref() {
            prompt.push_str(&format!("\nTheir focus: {}.", focus));
        }
        if let Some(goals) = persona.goals.as_deref() {
            prompt.push_str(&format!("\nTheir goals: {}.", goals));
        }
        if !persona.skills.is_empty() {
            prompt.push_str(&format!("\nTheir skills: {}.", persona.skills.join(", ")));
        }
        if !persona.matches.is_empty() {
            prompt.push_str(&format!(
                "\nRecent marketplace matches for them: {}.",
                persona.matches.join("; ")
            ));
        }
    }

    if let Some(extras) = extras.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\nAdditional context from the app: {}", extras));
    }

    prompt
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn test_config(api_key: Option<&str>, base_url: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: api_key.map(str::to_string),
            model: "gpt-4.1-mini".to_string(),
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        }
    }

    fn user_message(content: &str) -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: content.to_string(),
        }]
    }

    /// Serve a fixed response on /chat/completions, return the base URL.
    async fn spawn_upstream(status: StatusCode, body: serde_json::Value) -> String {
        let port = portpicker::pick_unused_port().expect("free port");
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .expect("bind stub upstream");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub upstream");
        });
        format!("http://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn missing_credential_returns_not_connected_reply() {
        let service = ChatService::new(test_config(None, "https://api.openai.com/v1"));
        let reply = service.chat(&user_message("help me list a service"), None, None).await;
        assert!(reply.contains("not connected"));
    }

    #[tokio::test]
    async fn upstream_500_returns_fallback_reply() {
        let base_url = spawn_upstream(
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({"error": "boom"}),
        )
        .await;
        let service = ChatService::new(test_config(Some("test-key"), &base_url));
        let reply = service.chat(&user_message("hello"), None, None).await;
        assert!(reply.contains("having trouble reaching"));
    }

    #[tokio::test]
    async fn unreachable_upstream_returns_fallback_reply() {
        let port = portpicker::pick_unused_port().expect("free port");
        let service = ChatService::new(test_config(
            Some("test-key"),
            &format!("http://127.0.0.1:{}", port),
        ));
        let reply = service.chat(&user_message("hello"), None, None).await;
        assert!(reply.contains("having trouble reaching"));
    }

    #[tokio::test]
    async fn returns_completion_content() {
        let base_url = spawn_upstream(
            StatusCode::OK,
            serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "Use the Listings tab."}}
                ]
            }),
        )
        .await;
        let service = ChatService::new(test_config(Some("test-key"), &base_url));
        let reply = service.chat(&user_message("how do I list?"), None, None).await;
        assert_eq!(reply, "Use the Listings tab.");
    }

    #[tokio::test]
    async fn empty_choices_yield_empty_reply() {
        let base_url = spawn_upstream(StatusCode::OK, serde_json::json!({"choices": []})).await;
        let service = ChatService::new(test_config(Some("test-key"), &base_url));
        let reply = service.chat(&user_message("hi"), None, None).await;
        assert_eq!(reply, "");
    }

    #[test]
    fn system_prompt_without_persona_is_platform_scope_only() {
        let prompt = build_system_prompt(None, None);
        assert_eq!(prompt, PLATFORM_PROMPT);
    }

    #[test]
    fn system_prompt_embeds_persona_and_extras() {
        let persona = ChatPersona {
            display_name: Some("Mira".to_string()),
            role: Some("freelancer".to_string()),
            focus: Some("brand design".to_string()),
            goals: Some("land retainer clients".to_string()),
            skills: vec!["figma".to_string(), "illustration".to_string()],
            matches: vec!["Logo Design".to_string(), "Brand Refresh".to_string()],
        };
        let prompt = build_system_prompt(Some(&persona), Some("user is on the billing page"));
        assert!(prompt.starts_with(PLATFORM_PROMPT));
        assert!(prompt.contains("Mira, a freelancer"));
        assert!(prompt.contains("brand design"));
        assert!(prompt.contains("land retainer clients"));
        assert!(prompt.contains("figma, illustration"));
        assert!(prompt.contains("Logo Design; Brand Refresh"));
        assert!(prompt.contains("billing page"));
    }
}
