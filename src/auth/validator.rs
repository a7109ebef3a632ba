//! Password validator
//!
//! Checks a login attempt against the configured shared secret.

use crate::config::ServerConfig;
use crate::error::AuthError;

const MAX_PASSWORD_LENGTH: usize = 512;

/// Performs basic input sanitation to check for malicious or malformed input.
fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Validates that the candidate matches the shared secret.
pub fn validate_password(candidate: &str, config: &ServerConfig) -> Result<(), AuthError> {
    if !is_valid_input(candidate, MAX_PASSWORD_LENGTH) {
        return Err(AuthError::MalformedInput("Invalid password format".into()));
    }

    if constant_time_eq(candidate.as_bytes(), config.password.as_bytes()) {
        Ok(())
    } else {
        Err(AuthError::InvalidPassword)
    }
}

/// Compares without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(password: &str) -> ServerConfig {
        ServerConfig {
            password: password.to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_correct_password() {
        assert!(validate_password("s3cret", &config("s3cret")).is_ok());
    }

    #[test]
    fn test_wrong_password() {
        assert!(matches!(
            validate_password("s3cre", &config("s3cret")),
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            validate_password("s3cret!", &config("s3cret")),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            validate_password("", &config("s3cret")),
            Err(AuthError::MalformedInput(_))
        ));
        assert!(matches!(
            validate_password("s3cret\r\n", &config("s3cret")),
            Err(AuthError::MalformedInput(_))
        ));
    }
}
