//! Secret handling utilities.
//!
//! Re-exports secrecy types and turns bearer tokens into header values
//! without the token ever reaching a log line.

pub use secrecy::{ExposeSecret, SecretString};

use reqwest::header::HeaderValue;

/// Build an `Authorization` value of the form `Bearer <token>`.
///
/// The value is marked sensitive so `HeaderMap`'s `Debug` output redacts
/// it. Returns `None` for tokens containing bytes a header cannot carry.
pub fn bearer_header(token: &SecretString) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).ok()?;
    value.set_sensitive(true);
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_is_sensitive() {
        let value = bearer_header(&SecretString::from("abc123".to_string())).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
        assert!(value.is_sensitive());
    }

    #[test]
    fn bearer_header_rejects_control_characters() {
        assert!(bearer_header(&SecretString::from("bad\ntoken".to_string())).is_none());
    }
}
