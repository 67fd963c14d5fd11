use axum::{
    Router,
    middleware::from_fn_with_state,
    response::Html,
    routing::{delete, get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{account, gate, messages, suggest};

pub fn api_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/sign-up", post(account::sign_up))
        .route("/api/verify-user", post(account::verify_user))
        .route("/api/check-username-unique", get(account::check_username))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/send-message", post(messages::send_message))
        .route("/api/suggest-messages", post(suggest::suggest_messages))
        .with_state(state.clone());

    let protected = Router::new()
        .route(
            "/api/accept-messages",
            post(messages::set_accepting_messages).get(messages::get_accepting_status),
        )
        .route("/api/get-messages", get(messages::get_messages))
        .route("/api/delete-message/{message_id}", delete(messages::delete_message))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    public.merge(protected)
}

/// Placeholder pages behind the route gate; the real views belong to the
/// web client, not this server.
pub fn pages_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/sign-in", get(client_page))
        .route("/sign-up", get(client_page))
        .route("/verify-email", get(client_page))
        .route("/reset-password", get(client_page))
        .route("/dashboard", get(client_page))
        .layer(from_fn_with_state(state.clone(), gate::page_gate))
        .with_state(state)
}

async fn landing_page() -> Html<&'static str> {
    Html("<h1>Murmur</h1><p>Anonymous messages for anyone with your link.</p>")
}

async fn client_page() -> Html<&'static str> {
    Html("<p>The web client renders this route.</p>")
}
