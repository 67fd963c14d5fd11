use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use murmur_types::api::{
    AcceptMessagesRequest, AcceptMessagesResponse, AcceptingStatusResponse, ApiResponse, Claims,
    GetMessagesResponse, SendMessageRequest,
};
use murmur_types::models::Message;
use murmur_types::validate::validate_message_content;

use crate::auth::{AppState, summarize};
use crate::error::ApiError;

pub async fn set_accepting_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AcceptMessagesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .set_accepting_message(&claims.sub.to_string(), req.accept_messages)?
        .ok_or_else(|| ApiError::NotFound("User not found and, hence, not updated".into()))?;

    Ok(Json(AcceptMessagesResponse {
        success: true,
        message: "Message acceptance status updated successfully".into(),
        updated_user: summarize(&updated)?,
    }))
}

pub async fn get_accepting_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(AcceptingStatusResponse {
        success: true,
        message: "User found successfully".into(),
        is_accepting_message: user.is_accepting_message,
    }))
}

/// Anonymous submission: no session required, only the owner's username.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_message_content(&req.content).map_err(|e| ApiError::Validation(e.into()))?;

    let username = req.username.to_lowercase();
    let message_id = Uuid::new_v4();
    let created_at = Utc::now().to_rfc3339();
    let content = req.content;

    // Run blocking DB work off the async runtime
    let db_state = state.clone();
    tokio::task::spawn_blocking(move || {
        let user = db_state
            .db
            .get_user_by_username(&username)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        // The flag is read at submission time; a concurrent toggle simply
        // wins or loses this race.
        if !user.is_accepting_message {
            return Err(ApiError::NotAccepting);
        }

        db_state
            .db
            .insert_message(&message_id.to_string(), &user.id, &content, &created_at)?;
        Ok(())
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {e}"))??;

    Ok(Json(ApiResponse {
        success: true,
        message: "Message sent successfully".into(),
    }))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();

    let db_state = state.clone();
    let rows = tokio::task::spawn_blocking(move || {
        if db_state.db.get_user_by_id(&user_id)?.is_none() {
            return Err(ApiError::NotFound("User not found".into()));
        }
        Ok(db_state.db.list_messages(&user_id)?)
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {e}"))??;

    let messages: Vec<Message> = rows
        .into_iter()
        .map(|row| Message {
            id: row.id.parse().unwrap_or_else(|e| {
                warn!("Corrupt message id '{}': {}", row.id, e);
                Uuid::default()
            }),
            created_at: parse_timestamp(&row.created_at, &row.id),
            content: row.content,
        })
        .collect();

    Ok(Json(GetMessagesResponse {
        success: true,
        message: "Messages retrieved successfully".into(),
        messages,
    }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();

    let db_state = state.clone();
    let deleted = tokio::task::spawn_blocking(move || {
        db_state.db.delete_message(&user_id, &message_id.to_string())
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {e}"))??;

    // Also covers an id owned by someone else: report plain absence rather
    // than leaking whose message it was.
    if !deleted {
        return Err(ApiError::NotFound("Failed to delete message".into()));
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Message deleted successfully".into(),
    }))
}

/// Rows written by the server carry RFC 3339; SQLite's own default is
/// "YYYY-MM-DD HH:MM:SS" without a timezone. Accept both.
fn parse_timestamp(raw: &str, message_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message '{}': {}", raw, message_id, e);
            DateTime::default()
        })
}
