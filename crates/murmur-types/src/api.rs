use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, UserSummary};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the page gate. Canonical
/// definition lives here in murmur-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_accepting_message: bool,
    pub exp: usize,
}

// -- Envelope --

/// Minimal response shape. Every endpoint answers with `success` plus a
/// human-readable `message`; richer responses add fields alongside.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyUserRequest {
    pub username: String,
    pub code: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AcceptMessagesRequest {
    pub accept_messages: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptMessagesResponse {
    pub success: bool,
    pub message: String,
    pub updated_user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptingStatusResponse {
    pub success: bool,
    pub message: String,
    pub is_accepting_message: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub username: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    pub success: bool,
    pub message: String,
    pub messages: Vec<Message>,
}

// -- Suggestions --

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub prompt: String,
}
