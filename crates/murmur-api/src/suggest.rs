use std::time::Duration;

use anyhow::{Context, anyhow};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use serde::Serialize;
use tokio::time::timeout;

use murmur_types::api::SuggestRequest;

use crate::auth::AppState;
use crate::error::ApiError;

/// How long the upstream model gets to start answering.
const SUGGEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "Create a list of three open-ended and engaging questions formatted \
    as a single string. Each question should be separated by '||'. These questions are for an \
    anonymous social messaging platform and should be suitable for a diverse audience. Avoid \
    personal or sensitive topics, focusing instead on universal themes that encourage friendly \
    interaction. Ensure the questions are intriguing, foster curiosity, and contribute to a \
    positive and welcoming conversational environment.";

/// Opaque text-generation collaborator reached over HTTP. Its response body
/// streams back to the caller as it arrives.
pub struct SuggestClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    system: &'a str,
    prompt: &'a str,
    max_tokens: u32,
}

impl SuggestClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    async fn stream_completion(&self, prompt: &str) -> anyhow::Result<reqwest::Response> {
        let request = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                system: SYSTEM_PROMPT,
                prompt,
                max_tokens: 1500,
            })
            .send();

        let response = timeout(SUGGEST_TIMEOUT, request)
            .await
            .context("suggestion service timed out")?
            .context("suggestion service unreachable")?;

        if !response.status().is_success() {
            return Err(anyhow!("suggestion service returned {}", response.status()));
        }

        Ok(response)
    }
}

pub async fn suggest_messages(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Response, ApiError> {
    let Some(client) = &state.suggest else {
        return Err(ApiError::NotFound("Suggestions are not configured".into()));
    };

    let upstream = client.stream_completion(&req.prompt).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| anyhow!("failed to build response: {e}"))?;

    Ok(response)
}
