//! API authentication via a shared token.
//!
//! Protected endpoints accept the token as `Authorization: Bearer <token>`,
//! an `X-API-Token` header, or a `token` query parameter (so the browser
//! dashboard can be opened from a plain link).

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Token presented by the request, if any.
fn presented_token<'a>(headers: &'a HeaderMap, query: Option<&'a str>) -> Option<&'a str> {
    if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim());
        }
    }
    if let Some(value) = headers.get("x-api-token").and_then(|v| v.to_str().ok()) {
        return Some(value.trim());
    }
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .map(str::trim)
}

/// Middleware that rejects requests without the configured token.
///
/// An empty configured token never matches, so a host started without a
/// token keeps its protected routes closed.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let expected = state.api_token.trim();
    match presented_token(req.headers(), req.uri().query()) {
        Some(token) if !expected.is_empty() && token == expected => next.run(req).await,
        Some(_) => ApiError::Unauthorized("Invalid API token".to_string()).into_response(),
        None => ApiError::Unauthorized("Missing API token".to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(presented_token(&headers, None), Some("abc"));
    }

    #[test]
    fn test_api_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-token", HeaderValue::from_static(" abc "));
        assert_eq!(presented_token(&headers, None), Some("abc"));
    }

    #[test]
    fn test_query_parameter() {
        let headers = HeaderMap::new();
        assert_eq!(presented_token(&headers, Some("a=1&token=abc")), Some("abc"));
        assert_eq!(presented_token(&headers, Some("a=1")), None);
        assert_eq!(presented_token(&headers, None), None);
    }

    #[test]
    fn test_non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(presented_token(&headers, None), None);
    }
}
