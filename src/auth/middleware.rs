use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::token::{bearer_token, Claims, TokenIssuer};
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Missing or non-bearer header is 401; a token that fails verification is 403.
///
/// # Errors
/// Returns `Unauthorized` or `Forbidden` as described above.
pub fn authenticate(tokens: &TokenIssuer, headers: &HeaderMap) -> Result<Claims> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| ApiError::Unauthorized("Token is missing".to_string()))?;

    tokens.verify(token)
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let claims = authenticate(&state.tokens, request.headers())?;
    debug!(user_id = claims.id, "authenticated request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let claims = authenticate(&state.tokens, request.headers())?;
    if !claims.is_admin {
        return Err(ApiError::Forbidden("Administrator access required".to_string()));
    }
    debug!(user_id = claims.id, "authenticated admin request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::authenticate;
    use crate::auth::TokenIssuer;
    use crate::error::ApiError;
    use crate::types::UserRecord;
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
    use chrono::Utc;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let issuer = TokenIssuer::new("secret", 60);
        assert!(matches!(
            authenticate(&issuer, &HeaderMap::new()),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            authenticate(&issuer, &headers("Basic dXNlcjpwYXNz")),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn bad_token_is_forbidden() {
        let issuer = TokenIssuer::new("secret", 60);
        assert!(matches!(
            authenticate(&issuer, &headers("Bearer nope")),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn valid_token_yields_claims() {
        let issuer = TokenIssuer::new("secret", 60);
        let user = UserRecord {
            id: 3,
            name: "Courier".to_string(),
            email: "c@boodai.kg".to_string(),
            password: String::new(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let Ok(token) = issuer.issue(&user) else {
            unreachable!("signing should succeed");
        };
        let claims = authenticate(&issuer, &headers(&format!("Bearer {token}")));
        assert!(matches!(claims, Ok(ref c) if c.id == 3 && !c.is_admin));
    }
}
