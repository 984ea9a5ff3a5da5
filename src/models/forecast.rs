use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_MOVING_AVERAGE_PERIOD: usize = 200;
pub const MAX_FORECAST_HORIZON: usize = 365;

/// Single point of a forecast chart series.
///
/// Historical points carry `actual`; projected points never do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeriesPoint {
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
    pub regression: f64,
    pub moving_average: Option<f64>,
    pub exponential_smoothing: f64,
}

impl ForecastSeriesPoint {
    pub fn is_projected(&self) -> bool {
        self.actual.is_none()
    }
}

/// Summary of the regression fit and its projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStatistics {
    pub slope: f64,
    pub intercept: f64,
    pub last_actual_price: f64,
    pub predicted_future_price: f64,
    /// `None` when the last actual price is zero.
    pub predicted_change_percent: Option<f64>,
    /// `None` when every historical price is identical (no variance to explain).
    pub r_squared: Option<f64>,
    pub sample_count: usize,
}

/// Output of the series builder. An empty series with no statistics means the
/// input had fewer than two samples.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub series: Vec<ForecastSeriesPoint>,
    pub statistics: Option<ForecastStatistics>,
}

impl ForecastOutput {
    pub fn insufficient() -> Self {
        Self::default()
    }

    pub fn is_insufficient(&self) -> bool {
        self.statistics.is_none()
    }
}

/// Validated builder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastParams {
    moving_average_period: usize,
    forecast_horizon: usize,
}

impl ForecastParams {
    pub fn new(moving_average_period: usize, forecast_horizon: usize) -> Result<Self, AppError> {
        if moving_average_period == 0 || moving_average_period > MAX_MOVING_AVERAGE_PERIOD {
            return Err(AppError::Validation(format!(
                "moving average period must be between 1 and {}, got {}",
                MAX_MOVING_AVERAGE_PERIOD, moving_average_period
            )));
        }
        if forecast_horizon == 0 || forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(AppError::Validation(format!(
                "forecast horizon must be between 1 and {}, got {}",
                MAX_FORECAST_HORIZON, forecast_horizon
            )));
        }
        Ok(Self {
            moving_average_period,
            forecast_horizon,
        })
    }

    pub fn moving_average_period(&self) -> usize {
        self.moving_average_period
    }

    pub fn forecast_horizon(&self) -> usize {
        self.forecast_horizon
    }
}

/// Forecasting methodology a user prefers to see highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    LinearRegression,
    MovingAverage,
    ExponentialSmoothing,
}

impl ForecastMethod {
    pub fn description(&self) -> &'static str {
        match self {
            ForecastMethod::LinearRegression => {
                "Least-squares trend line extrapolated past the last sample"
            }
            ForecastMethod::MovingAverage => "Mean of the most recent prices, held flat forward",
            ForecastMethod::ExponentialSmoothing => {
                "Recursive average weighting recent prices, held flat forward"
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetForecastMethodRequest {
    pub method: ForecastMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastMethodPreference {
    pub symbol: String,
    pub method: Option<ForecastMethod>,
    pub description: Option<&'static str>,
}

impl ForecastMethodPreference {
    pub fn new(symbol: String, method: Option<ForecastMethod>) -> Self {
        Self {
            symbol,
            description: method.map(|m| m.description()),
            method,
        }
    }
}

/// API response for a symbol forecast
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolForecastResponse {
    Ready {
        symbol: String,
        moving_average_period: usize,
        forecast_horizon: usize,
        preferred_method: Option<ForecastMethod>,
        series: Vec<ForecastSeriesPoint>,
        statistics: ForecastStatistics,
    },
    InsufficientData {
        symbol: String,
        sample_count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_reject_zero_period() {
        assert!(ForecastParams::new(0, 5).is_err());
    }

    #[test]
    fn test_params_reject_oversized_horizon() {
        assert!(ForecastParams::new(7, MAX_FORECAST_HORIZON + 1).is_err());
    }

    #[test]
    fn test_params_accept_bounds() {
        let params = ForecastParams::new(MAX_MOVING_AVERAGE_PERIOD, 1).unwrap();
        assert_eq!(params.moving_average_period(), MAX_MOVING_AVERAGE_PERIOD);
        assert_eq!(params.forecast_horizon(), 1);
    }

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&ForecastMethod::ExponentialSmoothing).unwrap();
        assert_eq!(json, "\"exponential_smoothing\"");
    }

    #[test]
    fn test_projected_point_omits_actual() {
        let point = ForecastSeriesPoint {
            timestamp: 1,
            actual: None,
            regression: 2.0,
            moving_average: None,
            exponential_smoothing: 2.0,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("actual").is_none());
        assert!(point.is_projected());
    }
}
