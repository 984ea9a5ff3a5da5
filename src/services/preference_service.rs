use std::sync::Arc;

use dashmap::DashMap;

use crate::models::ForecastMethod;

/// Preferred forecast method per display symbol.
#[derive(Clone, Default)]
pub struct ForecastPreferences {
    methods: Arc<DashMap<String, ForecastMethod>>,
}

impl ForecastPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<ForecastMethod> {
        self.methods.get(symbol).map(|m| *m)
    }

    pub fn set(&self, symbol: &str, method: ForecastMethod) {
        self.methods.insert(symbol.to_string(), method);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_previous_choice() {
        let prefs = ForecastPreferences::new();
        assert_eq!(prefs.get("BTC"), None);

        prefs.set("BTC", ForecastMethod::MovingAverage);
        prefs.set("BTC", ForecastMethod::ExponentialSmoothing);

        assert_eq!(prefs.get("BTC"), Some(ForecastMethod::ExponentialSmoothing));
        assert_eq!(prefs.get("ETH"), None);
    }
}
