use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// A single observation of a market price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: i64, // epoch milliseconds
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Sorts samples ascending by timestamp. Stable, so equal timestamps keep upstream order.
pub fn sort_samples(samples: &mut [PriceSample]) {
    samples.sort_by_key(|s| s.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_samples_orders_by_timestamp() {
        let mut samples = vec![
            PriceSample::new(3_000, 3.0),
            PriceSample::new(1_000, 1.0),
            PriceSample::new(2_000, 2.0),
        ];

        sort_samples(&mut samples);

        let ts: Vec<i64> = samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(ts, vec![1_000, 2_000, 3_000]);
    }

    #[test]
    fn test_observed_at_converts_millis() {
        let sample = PriceSample::new(86_400_000, 10.0);
        let dt = sample.observed_at().unwrap();
        assert_eq!(dt.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }
}
