use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// Price Alert Models
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: Uuid,
    pub symbol: String,
    pub direction: AlertDirection,
    pub target_price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlertRequest {
    pub symbol: String,
    pub direction: AlertDirection,
    pub target_price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertQueryParams {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertDirection {
    Above,
    Below,
}

impl AlertDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertDirection::Above => "above",
            AlertDirection::Below => "below",
        }
    }

    /// Whether `price` has crossed `target` in this direction. Touching the target counts.
    pub fn is_crossed(&self, price: f64, target: f64) -> bool {
        match self {
            AlertDirection::Above => price >= target,
            AlertDirection::Below => price <= target,
        }
    }
}

// ==============================================================================
// Alert Settings
// ==============================================================================

/// Percent-move notification settings for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub enabled: bool,
    pub threshold_percent: f64,
}

// ==============================================================================
// Alert Events
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertEventKind {
    PriceTarget,
    PercentMove,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub alert_id: Option<Uuid>,
    pub symbol: String,
    pub kind: AlertEventKind,
    pub observed_price: f64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
