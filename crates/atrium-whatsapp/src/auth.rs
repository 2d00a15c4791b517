use axum::http::HeaderMap;

/// Checks either `?token=<token>` in the query string or
/// `Authorization: Bearer <token>` — the bridge has shipped clients that
/// use each location, so both are accepted, per §4.6.
pub fn is_authorized(expected: Option<&str>, headers: &HeaderMap, query_token: Option<&str>) -> bool {
    let Some(expected) = expected else {
        // No token configured — the bridge is running unauthenticated.
        return true;
    };

    if query_token == Some(expected) {
        return true;
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_token_authorizes() {
        assert!(is_authorized(Some("secret"), &HeaderMap::new(), Some("secret")));
    }

    #[test]
    fn bearer_header_authorizes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer secret".parse().unwrap());
        assert!(is_authorized(Some("secret"), &headers, None));
    }

    #[test]
    fn missing_token_is_unauthorized() {
        assert!(!is_authorized(Some("secret"), &HeaderMap::new(), None));
    }

    #[test]
    fn unconfigured_token_allows_everything() {
        assert!(is_authorized(None, &HeaderMap::new(), None));
    }
}
