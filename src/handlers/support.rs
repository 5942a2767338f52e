use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::filter::OwnerType;
use crate::middleware::AuthUser;
use crate::services::{ChatMessage, ChatPersona};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub context: Option<ChatContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(default)]
    pub extras: Option<String>,
}

/// POST /api/support/chat - proxy a conversation to the support assistant.
/// Never returns an HTTP error: credential and upstream problems surface as
/// canned replies inside a 200.
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> Json<Value> {
    let persona = build_persona(&state, &user).await;
    let extras = body.context.as_ref().and_then(|c| c.extras.as_deref());

    let reply = state.chat.chat(&body.messages, Some(&persona), extras).await;

    Json(json!({ "success": true, "reply": reply }))
}

/// Best-effort personalization. Every lookup failure just drops its block;
/// the chat must answer with or without it.
async fn build_persona(state: &AppState, auth: &AuthUser) -> ChatPersona {
    let mut persona = ChatPersona {
        role: Some(auth.role.clone()),
        ..Default::default()
    };

    match state.users.find(auth.user_id).await {
        Ok(Some(user)) => persona.display_name = user.display_name,
        Ok(None) => {}
        Err(err) => tracing::debug!("Chat personalization skipped user lookup: {}", err),
    }

    match OwnerType::from_role(&auth.role) {
        Some(OwnerType::Freelancer) => match state.owners.find_freelancer(auth.user_id).await {
            Ok(Some(profile)) => {
                persona.display_name = persona.display_name.or(profile.display_name);
                persona.focus = profile.focus;
                persona.goals = profile.goals;
                persona.skills = profile.skills;
            }
            Ok(None) => {}
            Err(err) => tracing::debug!("Chat personalization skipped profile lookup: {}", err),
        },
        Some(OwnerType::ServiceProvider) => match state.owners.find_provider(auth.user_id).await {
            Ok(Some(profile)) => {
                persona.display_name = persona.display_name.or(profile.display_name);
                persona.focus = profile.focus;
                persona.goals = profile.goals;
                persona.skills = profile.skills;
            }
            Ok(None) => {}
            Err(err) => tracing::debug!("Chat personalization skipped profile lookup: {}", err),
        },
        None => {}
    }

    if let Some(focus) = persona.focus.clone() {
        match state.listings.match_names(&focus, 3).await {
            Ok(names) => persona.matches = names,
            Err(err) => tracing::debug!("Chat personalization skipped match lookup: {}", err),
        }
    }

    persona
}
