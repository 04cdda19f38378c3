use std::time::Duration;

const RETRY_DELAY_CAP_MS: u64 = 30_000;

/// Return true for GitHub statuses worth retrying (rate limits and server errors).
pub fn is_retryable_github_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

pub fn is_retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

/// Parse a `Retry-After` header expressed in whole seconds.
pub fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Exponential backoff from `base_delay_ms`, overridden by a server-provided delay.
pub fn retry_delay(base_delay_ms: u64, attempt: usize, retry_after: Option<Duration>) -> Duration {
    if let Some(retry_after) = retry_after {
        return retry_after;
    }
    let exponent = attempt.saturating_sub(1).min(16) as u32;
    let delay_ms = base_delay_ms
        .max(1)
        .saturating_mul(2_u64.saturating_pow(exponent))
        .min(RETRY_DELAY_CAP_MS);
    Duration::from_millis(delay_ms)
}

pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated = text.chars().take(max_chars).collect::<String>();
    format!("{truncated}...")
}
