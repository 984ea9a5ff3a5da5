use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::alert::*;
use crate::models::LiveMarketData;
use crate::state::AppState;
use crate::utils::format::{format_percent, format_price};

pub const MAX_EVENT_LOG: usize = 100;
pub const PERCENT_MOVE_COOLDOWN_HOURS: i64 = 1;
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 5.0;

// ==============================================================================
// Alert Store
// ==============================================================================

/// In-memory price alerts, percent-move settings and the recent event log.
#[derive(Clone, Default)]
pub struct AlertStore {
    alerts: Arc<DashMap<Uuid, PriceAlert>>,
    settings: Arc<DashMap<String, AlertSettings>>,
    last_percent_event: Arc<DashMap<String, DateTime<Utc>>>,
    events: Arc<Mutex<VecDeque<AlertEvent>>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an alert, or retargets the active one with the same symbol and direction.
    pub fn upsert(
        &self,
        symbol: &str,
        direction: AlertDirection,
        target_price: f64,
    ) -> Result<PriceAlert, AppError> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(AppError::Validation("target_price must be a positive number".to_string()));
        }

        let existing = self
            .alerts
            .iter()
            .find(|a| a.is_active && a.symbol == symbol && a.direction == direction)
            .map(|a| a.id);

        if let Some(id) = existing {
            if let Some(mut alert) = self.alerts.get_mut(&id) {
                alert.target_price = target_price;
                return Ok(alert.clone());
            }
        }

        let alert = PriceAlert {
            id: Uuid::new_v4(),
            symbol: symbol.to_string(),
            direction,
            target_price,
            is_active: true,
            created_at: Utc::now(),
            triggered_at: None,
        };
        self.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    pub fn get(&self, id: Uuid) -> Result<PriceAlert, AppError> {
        self.alerts
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    /// Oldest first; `active` filters on the active flag when set.
    pub fn list(&self, active: Option<bool>) -> Vec<PriceAlert> {
        let mut alerts: Vec<PriceAlert> = self
            .alerts
            .iter()
            .filter(|a| active.map_or(true, |want| a.is_active == want))
            .map(|a| a.clone())
            .collect();
        alerts.sort_by_key(|a| a.created_at);
        alerts
    }

    pub fn disable(&self, id: Uuid) -> Result<PriceAlert, AppError> {
        let mut alert = self
            .alerts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))?;
        alert.is_active = false;
        Ok(alert.clone())
    }

    /// Returns how many alerts were switched off.
    pub fn disable_all(&self) -> usize {
        let mut count = 0;
        for mut alert in self.alerts.iter_mut() {
            if alert.is_active {
                alert.is_active = false;
                count += 1;
            }
        }
        count
    }

    pub fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.alerts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Alert {} not found", id)))
    }

    pub fn settings(&self, symbol: &str) -> AlertSettings {
        self.settings
            .get(symbol)
            .map(|s| *s)
            .unwrap_or(AlertSettings {
                enabled: false,
                threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            })
    }

    pub fn set_settings(&self, symbol: &str, settings: AlertSettings) -> Result<AlertSettings, AppError> {
        if !settings.threshold_percent.is_finite() || settings.threshold_percent <= 0.0 {
            return Err(AppError::Validation("threshold_percent must be a positive number".to_string()));
        }
        self.settings.insert(symbol.to_string(), settings);
        Ok(settings)
    }

    /// Symbols with an active alert or enabled percent-move settings, sorted.
    pub fn monitored_symbols(&self) -> Vec<String> {
        let mut symbols: BTreeSet<String> = self
            .alerts
            .iter()
            .filter(|a| a.is_active)
            .map(|a| a.symbol.clone())
            .collect();
        symbols.extend(
            self.settings
                .iter()
                .filter(|s| s.enabled)
                .map(|s| s.key().clone()),
        );
        symbols.into_iter().collect()
    }

    /// Checks `symbol`'s alerts and settings against a live quote.
    ///
    /// Triggered price alerts are deactivated. Produced events are appended to
    /// the event log and returned.
    pub fn evaluate(&self, symbol: &str, data: &LiveMarketData) -> Vec<AlertEvent> {
        self.evaluate_at(symbol, data, Utc::now())
    }

    fn evaluate_at(&self, symbol: &str, data: &LiveMarketData, now: DateTime<Utc>) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for mut alert in self.alerts.iter_mut() {
            if !alert.is_active || alert.symbol != symbol {
                continue;
            }
            if !alert.direction.is_crossed(data.price, alert.target_price) {
                continue;
            }

            alert.is_active = false;
            alert.triggered_at = Some(now);

            let verb = match alert.direction {
                AlertDirection::Above => "rose above",
                AlertDirection::Below => "fell below",
            };
            events.push(AlertEvent {
                id: Uuid::new_v4(),
                alert_id: Some(alert.id),
                symbol: symbol.to_string(),
                kind: AlertEventKind::PriceTarget,
                observed_price: data.price,
                message: format!(
                    "{} {} {} (now {})",
                    symbol,
                    verb,
                    format_price(alert.target_price),
                    format_price(data.price)
                ),
                created_at: now,
            });
        }

        let settings = self.settings(symbol);
        if let (true, Some(change)) = (settings.enabled, data.change_24h) {
            let cooling_down = self
                .last_percent_event
                .get(symbol)
                .map(|last| is_in_cooldown(*last, now))
                .unwrap_or(false);

            if change.abs() >= settings.threshold_percent && !cooling_down {
                self.last_percent_event.insert(symbol.to_string(), now);
                events.push(AlertEvent {
                    id: Uuid::new_v4(),
                    alert_id: None,
                    symbol: symbol.to_string(),
                    kind: AlertEventKind::PercentMove,
                    observed_price: data.price,
                    message: format!(
                        "{} moved {} in 24h (threshold {:.2}%), now {}",
                        symbol,
                        format_percent(change),
                        settings.threshold_percent,
                        format_price(data.price)
                    ),
                    created_at: now,
                });
            }
        }

        if !events.is_empty() {
            let mut log = self.events.lock();
            for event in &events {
                info!("🔔 {}", event.message);
                log.push_back(event.clone());
                while log.len() > MAX_EVENT_LOG {
                    log.pop_front();
                }
            }
        }

        events
    }

    /// Most recent events first.
    pub fn recent_events(&self, limit: usize) -> Vec<AlertEvent> {
        self.events.lock().iter().rev().take(limit).cloned().collect()
    }
}

fn is_in_cooldown(last_triggered: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - last_triggered < Duration::hours(PERCENT_MOVE_COOLDOWN_HOURS)
}

// ==============================================================================
// Symbol-resolving operations
// ==============================================================================

pub fn create_alert(state: &AppState, req: CreateAlertRequest) -> Result<PriceAlert, AppError> {
    let pair = state.symbols.resolve(&req.symbol)?;
    let alert = state.alerts.upsert(&pair.display, req.direction, req.target_price)?;
    info!(
        "Alert set: {} {} {}",
        alert.symbol,
        alert.direction.as_str(),
        format_price(alert.target_price)
    );
    Ok(alert)
}

pub fn get_settings(state: &AppState, symbol: &str) -> Result<(String, AlertSettings), AppError> {
    let pair = state.symbols.resolve(symbol)?;
    let settings = state.alerts.settings(&pair.display);
    Ok((pair.display, settings))
}

pub fn update_settings(
    state: &AppState,
    symbol: &str,
    settings: AlertSettings,
) -> Result<(String, AlertSettings), AppError> {
    let pair = state.symbols.resolve(symbol)?;
    let saved = state.alerts.set_settings(&pair.display, settings)?;
    Ok((pair.display, saved))
}
