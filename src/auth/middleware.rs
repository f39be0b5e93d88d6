use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, HttpRequest};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Extract the api key from the request headers.
fn extract_api_key(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
}

/// Compare without short-circuiting on the first differing byte.
fn keys_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Validate the request's api key against the configured shared secret.
pub fn validate_request_api_key(req: &HttpRequest, expected: &str) -> Result<(), Error> {
    let key = extract_api_key(req).ok_or_else(|| ErrorUnauthorized("Missing api key"))?;

    if !keys_match(key, expected) {
        return Err(ErrorUnauthorized("Invalid api key"));
    }

    Ok(())
}
