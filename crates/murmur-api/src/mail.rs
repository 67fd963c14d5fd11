use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const MAIL_FROM: &str = "Murmur <onboarding@resend.dev>";

/// Outbound mail collaborator. Verification codes go out through Resend's
/// REST API; the `Log` variant records the code instead, for local runs
/// without an API key.
pub enum Mailer {
    Resend(ResendClient),
    Log,
}

impl Mailer {
    pub async fn send_verification(&self, email: &str, username: &str, code: &str) -> Result<()> {
        match self {
            Mailer::Resend(client) => client.send_verification(email, username, code).await,
            Mailer::Log => {
                info!(email = %email, username = %username, code = %code, "mail disabled, verification code logged");
                Ok(())
            }
        }
    }
}

pub struct ResendClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: String,
}

impl ResendClient {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, RESEND_ENDPOINT.to_string())
    }

    /// Point at a non-default API host (regional endpoint, test double).
    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint,
        }
    }

    async fn send_verification(&self, email: &str, username: &str, code: &str) -> Result<()> {
        let body = SendEmailRequest {
            from: MAIL_FROM,
            to: [email],
            subject: "Verify your email address",
            html: verification_body(username, code),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("mail dispatch failed")?;

        if !response.status().is_success() {
            bail!("mail provider returned {}", response.status());
        }

        Ok(())
    }
}

fn verification_body(username: &str, code: &str) -> String {
    format!(
        "<p>Hello {username},</p>\
         <p>Your verification code is <strong>{code}</strong>. It expires in one hour.</p>"
    )
}
