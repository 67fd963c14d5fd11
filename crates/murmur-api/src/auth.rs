use std::sync::Arc;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use murmur_db::Database;
use murmur_db::models::UserRow;
use murmur_types::api::{Claims, SignInRequest, SignInResponse};
use murmur_types::models::UserSummary;

use crate::error::ApiError;
use crate::mail::Mailer;
use crate::suggest::SuggestClient;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub mailer: Mailer,
    pub suggest: Option<SuggestClient>,
}

/// Session cookie consumed by the page gate; API calls may carry the same
/// token as a bearer header instead.
pub const SESSION_COOKIE: &str = "murmur_session";

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::NotFound("No user found with this email".into()))?;

    if !user.is_verified {
        return Err(ApiError::NotVerified);
    }

    verify_password(&req.password, &user.password)?;

    let summary = summarize(&user)?;
    let token = create_token(&state.jwt_secret, &summary)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            success: true,
            message: "Signed in successfully".into(),
            user: summary,
            token,
        }),
    ))
}

/// Redacted view of a stored row; the password hash and the verify code
/// stay behind.
pub fn summarize(user: &UserRow) -> Result<UserSummary, ApiError> {
    let id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow!("corrupt user id '{}': {}", user.id, e))?;

    Ok(UserSummary {
        id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_verified: user.is_verified,
        is_accepting_message: user.is_accepting_message,
    })
}

pub fn create_token(secret: &str, user: &UserSummary) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_verified: user.is_verified,
        is_accepting_message: user.is_accepting_message,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow!("token encoding failed: {e}"))?;

    Ok(token)
}

pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?
        .to_string();

    Ok(hash)
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| anyhow!("corrupt password hash: {e}"))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidCredentials)
}
