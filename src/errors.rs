use thiserror::Error;

/// Failures that can occur while answering a single chat request.
///
/// Every variant's `Display` output feeds [`friendly_message`], so the
/// variants embed the signals the classifier looks for (HTTP status digits,
/// the word "timeout").
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("EMBED_{status}: embedding request failed")]
    Embedding { status: u16 },
    #[error("UPSTREAM_HTTP_{status}: {body_prefix}")]
    Upstream { status: u16, body_prefix: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("timeout waiting for completion")]
    Timeout,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub const MSG_BAD_KEY: &str = "⚠️ The assistant's API key is missing or invalid.";
pub const MSG_BILLING: &str = "⚠️ The assistant's API quota is exhausted.";
pub const MSG_THROTTLED: &str = "⚠️ Too many requests right now. Could you try again in a moment?";
pub const MSG_TIMEOUT: &str = "⚠️ That took too long. Could you try again?";
pub const MSG_GENERIC: &str = "⚠️ I couldn't generate a reply just now.";

/// Maps a raw error message to a user-facing string.
///
/// Total: every input falls through to the generic message. Checks are
/// ordered, most specific first.
pub fn friendly_message(raw: &str) -> &'static str {
    let low = raw.to_lowercase();
    if low.contains("401") || low.contains("invalid api key") {
        MSG_BAD_KEY
    } else if low.contains("insufficient_quota") {
        MSG_BILLING
    } else if low.contains("429") || low.contains("rate limit") {
        MSG_THROTTLED
    } else if low.contains("timeout") {
        MSG_TIMEOUT
    } else {
        MSG_GENERIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_throttle_regardless_of_case() {
        assert_eq!(friendly_message("Rate Limit exceeded"), MSG_THROTTLED);
        assert_eq!(friendly_message("UPSTREAM_HTTP_429: slow down"), MSG_THROTTLED);
    }

    #[test]
    fn unauthorized_takes_priority_over_later_checks() {
        assert_eq!(
            friendly_message("UPSTREAM_HTTP_401: invalid api key, rate limit?"),
            MSG_BAD_KEY
        );
    }

    #[test]
    fn quota_and_timeout_map_to_their_messages() {
        assert_eq!(friendly_message("insufficient_quota for this key"), MSG_BILLING);
        assert_eq!(friendly_message("timeout waiting for completion"), MSG_TIMEOUT);
    }

    #[test]
    fn unknown_message_maps_to_generic() {
        assert_eq!(friendly_message("something odd happened"), MSG_GENERIC);
        assert_eq!(friendly_message(""), MSG_GENERIC);
    }

    #[test]
    fn error_display_carries_classifier_signals() {
        let err = ChatError::Upstream {
            status: 429,
            body_prefix: "{}".to_string(),
        };
        assert_eq!(friendly_message(&err.to_string()), MSG_THROTTLED);
        assert_eq!(friendly_message(&ChatError::Timeout.to_string()), MSG_TIMEOUT);
    }
}
