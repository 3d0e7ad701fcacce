use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

#[derive(Deserialize)]
struct JwtPayload {
    sub: String,
}

/// Pulls the user id out of a bearer JWT without verifying the signature.
/// Token issuance and verification are the auth service's problem; this
/// service only needs a stable `sub`.
fn user_from_bearer(headers: &axum::http::HeaderMap) -> Option<AuthenticatedUser> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let payload: JwtPayload = serde_json::from_slice(&payload_bytes).ok()?;
    if payload.sub.trim().is_empty() {
        return None;
    }
    Some(AuthenticatedUser { id: payload.sub })
}

/// For public routes that show extra data to a signed-in caller.
pub fn optional_user(headers: &axum::http::HeaderMap) -> Option<AuthenticatedUser> {
    user_from_bearer(headers)
}

pub async fn require_auth(mut request: Request, next: Next) -> Response {
    if let Some(user) = user_from_bearer(request.headers()) {
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "unauthorized" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn bearer_for(payload: &str) -> HeaderValue {
        let token = format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode("sig")
        );
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    #[test]
    fn extracts_sub_from_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, bearer_for(r#"{"sub":"user-42"}"#));
        let user = user_from_bearer(&headers).expect("should parse");
        assert_eq!(user.id, "user-42");
    }

    #[test]
    fn rejects_missing_or_garbled_tokens() {
        let headers = HeaderMap::new();
        assert!(user_from_bearer(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer not.a.jwt"),
        );
        assert!(user_from_bearer(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, bearer_for(r#"{"sub":""}"#));
        assert!(user_from_bearer(&headers).is_none());
    }
}
