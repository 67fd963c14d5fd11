use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use murmur_types::api::{ApiResponse, SignUpRequest, VerifyUserRequest};
use murmur_types::validate::{validate_email, validate_password, validate_username};

use crate::auth::{AppState, hash_password};
use crate::error::ApiError;

/// How long a verification code stays valid.
const VERIFY_CODE_TTL_HOURS: i64 = 1;

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&req.username).map_err(|e| ApiError::Validation(e.into()))?;
    validate_email(&req.email).map_err(|e| ApiError::Validation(e.into()))?;
    validate_password(&req.password).map_err(|e| ApiError::Validation(e.into()))?;

    let username = req.username.to_lowercase();

    if state.db.verified_username_exists(&username)? {
        return Err(ApiError::Validation("Username is already taken".into()));
    }

    let existing_by_email = state.db.get_user_by_email(&req.email)?;
    if existing_by_email.as_ref().is_some_and(|user| user.is_verified) {
        return Err(ApiError::Validation("This email is already registered".into()));
    }

    let verify_code = generate_verify_code();
    let expiry = (Utc::now() + Duration::hours(VERIFY_CODE_TTL_HOURS)).to_rfc3339();
    let password_hash = hash_password(&req.password)?;

    let (status, message) = match existing_by_email {
        // Re-registration before verification takes over the row in place.
        Some(user) => {
            state
                .db
                .update_registration(&user.id, &username, &password_hash, &verify_code, &expiry)?;
            (
                StatusCode::OK,
                "User registration updated. Please verify your email to complete registration.",
            )
        }
        None => {
            let id = Uuid::new_v4();
            state.db.create_user(
                &id.to_string(),
                &username,
                &req.email,
                &password_hash,
                &verify_code,
                &expiry,
            )?;
            (
                StatusCode::CREATED,
                "User registered successfully. Please verify your email to complete registration.",
            )
        }
    };

    // The row persists either way, but registration only counts once the
    // code is on its way out; re-registration is the recovery route.
    if let Err(err) = state.mailer.send_verification(&req.email, &username, &verify_code).await {
        error!(error = %err, email = %req.email, "verification email dispatch failed");
        return Err(ApiError::Delivery);
    }

    info!(username = %username, "verification code dispatched");

    Ok((status, Json(ApiResponse { success: true, message: message.into() })))
}

pub async fn verify_user(
    State(state): State<AppState>,
    Json(req): Json<VerifyUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.to_lowercase();

    let user = state
        .db
        .get_user_by_username(&username)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    // A mismatched code is reported before expiry is even considered.
    if user.verify_code != req.code {
        return Err(ApiError::Validation("Incorrect verification code".into()));
    }

    let expired = DateTime::parse_from_rfc3339(&user.verify_code_expiry)
        .map(|expiry| expiry < Utc::now())
        .unwrap_or(true);
    if expired {
        return Err(ApiError::Validation(
            "Verification code has expired. Please sign up again to get a new code.".into(),
        ));
    }

    state.db.mark_verified(&user.id)?;

    info!(username = %username, "user verified");

    Ok(Json(ApiResponse {
        success: true,
        message: "User verified successfully".into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let username = query
        .username
        .ok_or_else(|| ApiError::Validation("Invalid query parameter".into()))?;
    validate_username(&username).map_err(|e| ApiError::Validation(e.into()))?;

    if state.db.verified_username_exists(&username.to_lowercase())? {
        return Err(ApiError::Validation("Username is already taken".into()));
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Username is available".into(),
    }))
}

/// Uniformly sampled 6-digit code.
fn generate_verify_code() -> String {
    rand::rng().random_range(100_000..=999_999).to_string()
}
