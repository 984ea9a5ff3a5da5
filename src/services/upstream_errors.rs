//! Classification of upstream failure messages into actionable user-facing text.

use crate::external::price_provider::PriceProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamIssue {
    QuotaExhausted,
    Configuration,
    Timeout,
    Network,
    Other,
}

pub fn classify(message: &str) -> UpstreamIssue {
    let lower = message.to_lowercase();

    if lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("quota")
        || lower.contains("credits")
        || lower.contains("out of cycles")
        || lower.contains("429")
    {
        return UpstreamIssue::QuotaExhausted;
    }

    if lower.contains("api key")
        || lower.contains("configuration")
        || lower.contains("unauthorized")
        || lower.contains("401")
        || lower.contains("403")
    {
        return UpstreamIssue::Configuration;
    }

    // reqwest reports timeouts through its network error, so check these first
    if lower.contains("timeout") || lower.contains("timed out") {
        return UpstreamIssue::Timeout;
    }

    if lower.contains("network") || lower.contains("connect") || lower.contains("dns") {
        return UpstreamIssue::Network;
    }

    UpstreamIssue::Other
}

/// Variant first; only service and network messages are scanned for keywords.
pub fn issue_for(err: &PriceProviderError) -> UpstreamIssue {
    match err {
        PriceProviderError::RateLimited => UpstreamIssue::QuotaExhausted,
        PriceProviderError::Service(message) => classify(message),
        PriceProviderError::Network(message) => match classify(message) {
            UpstreamIssue::Timeout => UpstreamIssue::Timeout,
            _ => UpstreamIssue::Network,
        },
        PriceProviderError::Parse(_) | PriceProviderError::NoData(_) => UpstreamIssue::Other,
    }
}

pub fn user_message_for(err: &PriceProviderError) -> String {
    describe(issue_for(err), &err.to_string())
}

fn describe(issue: UpstreamIssue, message: &str) -> String {
    match issue {
        UpstreamIssue::QuotaExhausted => {
            "Market data provider quota exhausted. Live data is temporarily unavailable, try again shortly."
                .to_string()
        }
        UpstreamIssue::Configuration => {
            "Market data provider configuration error. Check the provider URL and API key."
                .to_string()
        }
        UpstreamIssue::Timeout => {
            "Connection timeout: the market data provider took too long to respond. Please try again."
                .to_string()
        }
        UpstreamIssue::Network => {
            "Network connection error. Please check connectivity to the market data provider and try again."
                .to_string()
        }
        UpstreamIssue::Other if message.trim().is_empty() => "Unknown error occurred".to_string(),
        UpstreamIssue::Other => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_messages() {
        assert_eq!(classify("rate limited"), UpstreamIssue::QuotaExhausted);
        assert_eq!(classify("service error: HTTP 429 Too Many Requests"), UpstreamIssue::QuotaExhausted);
        assert_eq!(classify("Canister out of cycles"), UpstreamIssue::QuotaExhausted);
    }

    #[test]
    fn test_timeout_wins_over_network() {
        assert_eq!(
            classify("network error: operation timed out"),
            UpstreamIssue::Timeout
        );
    }

    #[test]
    fn test_network_and_configuration() {
        assert_eq!(classify("network error: connection refused"), UpstreamIssue::Network);
        assert_eq!(classify("service error: HTTP 401 Unauthorized"), UpstreamIssue::Configuration);
    }

    #[test]
    fn test_unmatched_message_passes_through() {
        assert_eq!(
            user_message_for(&PriceProviderError::Service("HTTP 500 Internal Server Error".into())),
            "service error: HTTP 500 Internal Server Error"
        );
        assert_eq!(describe(UpstreamIssue::Other, "   "), "Unknown error occurred");
    }

    #[test]
    fn test_parse_and_no_data_never_keyword_matched() {
        let parse = PriceProviderError::Parse("unexpected token at offset 429".into());
        let no_data = PriceProviderError::NoData("connect-coin".into());

        assert_eq!(issue_for(&parse), UpstreamIssue::Other);
        assert_eq!(user_message_for(&parse), "parse error: unexpected token at offset 429");
        assert_eq!(issue_for(&no_data), UpstreamIssue::Other);
        assert_eq!(user_message_for(&no_data), "no data available for connect-coin");
    }

    #[test]
    fn test_variant_decides_before_message() {
        assert_eq!(issue_for(&PriceProviderError::RateLimited), UpstreamIssue::QuotaExhausted);
        assert_eq!(
            issue_for(&PriceProviderError::Network("error sending request".into())),
            UpstreamIssue::Network
        );
        assert_eq!(
            issue_for(&PriceProviderError::Network("operation timed out".into())),
            UpstreamIssue::Timeout
        );
        assert_eq!(
            issue_for(&PriceProviderError::Service("❌ API error: Invalid API key".into())),
            UpstreamIssue::Configuration
        );
    }
}
