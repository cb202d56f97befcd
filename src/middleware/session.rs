use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, SessionUser};
use crate::config::SecurityConfig;
use crate::scope::identity::cookie_value;
use crate::state::AppState;

/// Outcome of looking for a session on the incoming request
#[derive(Clone, Debug, PartialEq)]
pub enum SessionLookup {
    /// No token was presented
    Anonymous,
    /// A token was presented and verified
    Valid(SessionUser),
    /// A token was presented but failed verification
    Invalid(String),
}

impl SessionLookup {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionLookup::Valid(user) => Some(user),
            _ => None,
        }
    }
}

/// Session middleware: verifies the session token, if any, and stores the
/// lookup result in request extensions. Never rejects; rejection is the
/// request scope's decision.
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let lookup = resolve_session(request.headers(), &state.config.security);
    request.extensions_mut().insert(lookup);
    next.run(request).await
}

/// Resolve the session from an `Authorization: Bearer` header, falling back
/// to the session cookie
pub fn resolve_session(headers: &HeaderMap, security: &SecurityConfig) -> SessionLookup {
    let token = match extract_token(headers, &security.session_cookie) {
        Ok(Some(token)) => token,
        Ok(None) => return SessionLookup::Anonymous,
        Err(msg) => return SessionLookup::Invalid(msg),
    };

    match validate_jwt(security, &token) {
        Ok(claims) => SessionLookup::Valid(SessionUser::from(claims)),
        Err(e) => {
            tracing::debug!("Session token rejected: {}", e);
            SessionLookup::Invalid(e.to_string())
        }
    }
}

fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<Option<String>, String> {
    if let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            Some(_) => Err("Empty session token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    Ok(cookie_value(headers, cookie_name)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt, Claims};
    use crate::config::AppConfig;
    use axum::http::HeaderValue;
    use uuid::Uuid;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn anonymous_without_token() {
        let security = AppConfig::development().security;
        assert_eq!(resolve_session(&HeaderMap::new(), &security), SessionLookup::Anonymous);
    }

    #[test]
    fn accepts_bearer_token() {
        let security = AppConfig::development().security;
        let id = Uuid::new_v4();
        let token = generate_jwt(&security, &Claims::new(id, None, None, 1)).unwrap();

        let lookup = resolve_session(&headers(&[("authorization", &format!("Bearer {token}"))]), &security);
        assert_eq!(lookup.user().map(|u| u.id), Some(id));
    }

    #[test]
    fn accepts_session_cookie() {
        let security = AppConfig::development().security;
        let id = Uuid::new_v4();
        let token = generate_jwt(&security, &Claims::new(id, None, None, 1)).unwrap();
        let cookie = format!("theme=dark; {}={}", security.session_cookie, token);

        let lookup = resolve_session(&headers(&[("cookie", &cookie)]), &security);
        assert_eq!(lookup.user().map(|u| u.id), Some(id));
    }

    #[test]
    fn malformed_header_is_invalid() {
        let security = AppConfig::development().security;
        let lookup = resolve_session(&headers(&[("authorization", "Basic abc")]), &security);
        assert!(matches!(lookup, SessionLookup::Invalid(_)));

        let lookup = resolve_session(&headers(&[("authorization", "Bearer not-a-jwt")]), &security);
        assert!(matches!(lookup, SessionLookup::Invalid(_)));
    }
}
