//! Parsing of raw CoinGecko payloads into typed outcomes.
//!
//! Every parse yields exactly one of: data, a well-formed payload with zero data
//! points, or a failure. Failures distinguish an explicit upstream error (the `❌`
//! sentinel or a provider error envelope) from a payload we could not understand.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::external::price_provider::PriceProviderError;
use crate::models::{sort_samples, LiveMarketData, PriceSample};

const ERROR_SENTINEL: char = '❌';

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Data(T),
    Empty,
    Failed(ParseFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    /// The upstream explicitly reported an error.
    Upstream(String),
    /// The payload did not have the expected shape.
    Malformed(String),
}

impl<T> ParseOutcome<T> {
    pub fn into_result(self, coin_id: &str) -> Result<T, PriceProviderError> {
        match self {
            ParseOutcome::Data(data) => Ok(data),
            ParseOutcome::Empty => Err(PriceProviderError::NoData(coin_id.to_string())),
            ParseOutcome::Failed(ParseFailure::Upstream(msg)) => Err(PriceProviderError::Service(msg)),
            ParseOutcome::Failed(ParseFailure::Malformed(msg)) => Err(PriceProviderError::Parse(msg)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChartEnvelope {
    prices: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
    usd_24h_change: Option<f64>,
    usd_market_cap: Option<f64>,
}

/// Parses a `/coins/{id}/market_chart` body: `{ "prices": [[ts_ms, price], ...], ... }`.
pub fn parse_historical_response(body: &str) -> ParseOutcome<Vec<PriceSample>> {
    let json = match parse_json(body) {
        Ok(json) => json,
        Err(failure) => return ParseOutcome::Failed(failure),
    };

    if let Some(msg) = upstream_error_message(&json) {
        return ParseOutcome::Failed(ParseFailure::Upstream(msg));
    }

    let envelope: MarketChartEnvelope = match serde_json::from_value(json) {
        Ok(envelope) => envelope,
        Err(e) => return ParseOutcome::Failed(ParseFailure::Malformed(format!("invalid price entry format: {}", e))),
    };

    let Some(entries) = envelope.prices else {
        return ParseOutcome::Failed(ParseFailure::Malformed(
            "invalid response format: missing prices array".to_string(),
        ));
    };

    let mut samples = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if entry.len() < 2 {
            return ParseOutcome::Failed(ParseFailure::Malformed(format!(
                "invalid price entry format at index {}",
                idx
            )));
        }
        let (timestamp, price) = (entry[0], entry[1]);
        if !timestamp.is_finite() || !price.is_finite() {
            return ParseOutcome::Failed(ParseFailure::Malformed(format!(
                "non-numeric price entry at index {}",
                idx
            )));
        }
        let sample = PriceSample::new(timestamp.round() as i64, price);
        if sample.observed_at().is_none() {
            return ParseOutcome::Failed(ParseFailure::Malformed(format!(
                "timestamp out of range at index {}",
                idx
            )));
        }
        samples.push(sample);
    }

    if samples.is_empty() {
        return ParseOutcome::Empty;
    }

    sort_samples(&mut samples);
    ParseOutcome::Data(samples)
}

/// Parses a `/simple/price` body: `{ "<coin-id>": { "usd": ..., "usd_24h_change": ..., ... } }`.
///
/// Looks up `coin_id` first and falls back to the first entry in the payload.
pub fn parse_live_market_response(body: &str, coin_id: &str) -> ParseOutcome<LiveMarketData> {
    let json = match parse_json(body) {
        Ok(json) => json,
        Err(failure) => return ParseOutcome::Failed(failure),
    };

    if let Some(msg) = upstream_error_message(&json) {
        return ParseOutcome::Failed(ParseFailure::Upstream(msg));
    }

    let mut entries: HashMap<String, SimplePriceEntry> = match serde_json::from_value(json) {
        Ok(entries) => entries,
        Err(e) => {
            return ParseOutcome::Failed(ParseFailure::Malformed(format!(
                "invalid response format from CoinGecko API: {}",
                e
            )))
        }
    };

    let entry = match entries.remove(coin_id) {
        Some(entry) => entry,
        None => match entries.into_values().next() {
            Some(entry) => entry,
            None => return ParseOutcome::Empty,
        },
    };

    match entry.usd {
        Some(price) if price.is_finite() => ParseOutcome::Data(LiveMarketData {
            price,
            change_24h: entry.usd_24h_change,
            market_cap: entry.usd_market_cap,
        }),
        _ => ParseOutcome::Failed(ParseFailure::Malformed(
            "missing usd price in quote".to_string(),
        )),
    }
}

fn parse_json(body: &str) -> Result<Value, ParseFailure> {
    let trimmed = body.trim_start();
    if trimmed.starts_with(ERROR_SENTINEL) {
        return Err(ParseFailure::Upstream(trimmed.to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| {
        if trimmed.is_empty() {
            ParseFailure::Malformed("empty response body".to_string())
        } else {
            ParseFailure::Malformed(format!("failed to parse response: {}", e))
        }
    })
}

/// CoinGecko reports errors either as `{"error": "..."}` or
/// `{"status": {"error_code": ..., "error_message": "..."}}`.
fn upstream_error_message(json: &Value) -> Option<String> {
    if let Some(msg) = json.get("error").and_then(Value::as_str) {
        return Some(msg.to_string());
    }

    let status = json.get("status")?;
    let message = status.get("error_message").and_then(Value::as_str)?;
    match status.get("error_code").and_then(Value::as_i64) {
        Some(code) => Some(format!("{} ({})", message, code)),
        None => Some(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_sorts_and_maps_entries() {
        let body = r#"{"prices": [[1700000200000, 36.5], [1700000000000, 35.0]], "market_caps": [], "total_volumes": []}"#;

        let outcome = parse_historical_response(body);

        assert_eq!(
            outcome,
            ParseOutcome::Data(vec![
                PriceSample::new(1_700_000_000_000, 35.0),
                PriceSample::new(1_700_000_200_000, 36.5),
            ])
        );
    }

    #[test]
    fn test_historical_empty_prices_is_distinct_from_failure() {
        let outcome = parse_historical_response(r#"{"prices": []}"#);
        assert_eq!(outcome, ParseOutcome::Empty);

        let err = outcome.into_result("bitcoin").unwrap_err();
        assert!(matches!(err, PriceProviderError::NoData(_)));
    }

    #[test]
    fn test_historical_missing_prices_is_malformed() {
        let outcome = parse_historical_response(r#"{"market_caps": []}"#);
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Malformed(_))));
    }

    #[test]
    fn test_historical_short_entry_is_malformed() {
        let outcome = parse_historical_response(r#"{"prices": [[1700000000000]]}"#);
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Malformed(_))));
    }

    #[test]
    fn test_historical_out_of_range_timestamp_is_malformed() {
        let outcome = parse_historical_response(r#"{"prices": [[9.2e18, 1.0], [9.22e18, 2.0]]}"#);
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Malformed(_))));

        let outcome = parse_historical_response(r#"{"prices": [[-1e30, 1.0]]}"#);
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Malformed(_))));
    }

    #[test]
    fn test_sentinel_is_upstream_failure() {
        let outcome = parse_historical_response("❌ HTTP outcall failed");
        assert_eq!(
            outcome,
            ParseOutcome::Failed(ParseFailure::Upstream("❌ HTTP outcall failed".to_string()))
        );
        let err = outcome.into_result("bitcoin").unwrap_err();
        assert!(matches!(err, PriceProviderError::Service(_)));
    }

    #[test]
    fn test_provider_error_envelope_is_upstream_failure() {
        let body = r#"{"status": {"error_code": 429, "error_message": "You've exceeded the Rate Limit"}}"#;
        let outcome = parse_historical_response(body);
        assert_eq!(
            outcome,
            ParseOutcome::Failed(ParseFailure::Upstream(
                "You've exceeded the Rate Limit (429)".to_string()
            ))
        );

        let outcome = parse_live_market_response(r#"{"error": "coin not found"}"#, "nope");
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Upstream(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let outcome = parse_historical_response("<html>bad gateway</html>");
        let err = outcome.into_result("bitcoin").unwrap_err();
        assert!(matches!(err, PriceProviderError::Parse(_)));
    }

    #[test]
    fn test_live_market_parses_requested_coin() {
        let body = r#"{"bitcoin": {"usd": 45000.5, "usd_24h_change": -1.25, "usd_market_cap": 880000000000.0}}"#;

        let outcome = parse_live_market_response(body, "bitcoin");

        assert_eq!(
            outcome,
            ParseOutcome::Data(LiveMarketData {
                price: 45000.5,
                change_24h: Some(-1.25),
                market_cap: Some(880_000_000_000.0),
            })
        );
    }

    #[test]
    fn test_live_market_empty_object_is_no_data() {
        assert_eq!(parse_live_market_response("{}", "unknown-coin"), ParseOutcome::Empty);
    }

    #[test]
    fn test_live_market_missing_usd_is_malformed() {
        let outcome = parse_live_market_response(r#"{"bitcoin": {"eur": 1.0}}"#, "bitcoin");
        assert!(matches!(outcome, ParseOutcome::Failed(ParseFailure::Malformed(_))));
    }
}
