//! Translates provider errors into the user-safe messages spec.md §7
//! requires: raw error text never escapes to the client.

use thinking::ThinkingError;

pub fn sanitize_provider_error(error: &ThinkingError) -> String {
    match error {
        ThinkingError::RateLimited(_) => "API rate limit exceeded. Please wait and retry.".to_string(),
        ThinkingError::TimedOut(_) => "Request timed out. Try reducing effort level.".to_string(),
        ThinkingError::AuthFailed(_) => "API authentication failed. Check server configuration.".to_string(),
        _ => "An internal error occurred during analysis.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_gets_a_retry_hint() {
        let message = sanitize_provider_error(&ThinkingError::RateLimited("429".into()));
        assert_eq!(message, "API rate limit exceeded. Please wait and retry.");
    }

    #[test]
    fn unmapped_errors_fall_back_to_the_generic_message() {
        let message = sanitize_provider_error(&ThinkingError::PermanentOther("boom".into()));
        assert_eq!(message, "An internal error occurred during analysis.");
    }

    #[test]
    fn raw_error_text_never_appears_in_the_sanitized_message() {
        let message = sanitize_provider_error(&ThinkingError::AuthFailed("sk-secret-key-leak".into()));
        assert!(!message.contains("sk-secret-key-leak"));
    }
}
