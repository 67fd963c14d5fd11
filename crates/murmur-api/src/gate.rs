use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::AppState;
use crate::middleware::{decode_token, session_token};

/// Path prefixes reachable without a session. Everything else is protected.
const PUBLIC_PREFIXES: &[&str] = &["/sign-in", "/sign-up", "/verify-email", "/reset-password"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    ToSignIn,
    ToDashboard,
}

pub fn is_public(path: &str) -> bool {
    path == "/" || PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Pure routing rule evaluated before any page handler runs: signed-in
/// visitors are bounced off public pages, signed-out visitors off protected
/// ones.
pub fn route_gate(authenticated: bool, path: &str) -> GateDecision {
    match (authenticated, is_public(path)) {
        (true, true) => GateDecision::ToDashboard,
        (false, false) => GateDecision::ToSignIn,
        _ => GateDecision::Allow,
    }
}

/// Middleware wrapping the page routes. Authentication here is a signature
/// check on the self-contained token — never a store lookup.
pub async fn page_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authenticated = session_token(&req)
        .and_then(|token| decode_token(&token, &state.jwt_secret))
        .is_some();

    match route_gate(authenticated, req.uri().path()) {
        GateDecision::Allow => next.run(req).await,
        GateDecision::ToSignIn => Redirect::to("/sign-in").into_response(),
        GateDecision::ToDashboard => Redirect::to("/dashboard").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_auth_pages_are_public() {
        assert!(is_public("/"));
        assert!(is_public("/sign-in"));
        assert!(is_public("/sign-up"));
        assert!(is_public("/verify-email/alice"));
        assert!(is_public("/reset-password/token123"));
        assert!(!is_public("/dashboard"));
        assert!(!is_public("/u/alice"));
    }

    #[test]
    fn authenticated_visitors_skip_public_pages() {
        assert_eq!(route_gate(true, "/"), GateDecision::ToDashboard);
        assert_eq!(route_gate(true, "/sign-in"), GateDecision::ToDashboard);
        assert_eq!(route_gate(true, "/dashboard"), GateDecision::Allow);
    }

    #[test]
    fn unauthenticated_visitors_are_sent_to_sign_in() {
        assert_eq!(route_gate(false, "/dashboard"), GateDecision::ToSignIn);
        assert_eq!(route_gate(false, "/"), GateDecision::Allow);
        assert_eq!(route_gate(false, "/sign-up"), GateDecision::Allow);
    }
}
