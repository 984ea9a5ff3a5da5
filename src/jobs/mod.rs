//! Background jobs run by the job scheduler.
//!
//! - `alert_monitoring_job` evaluates price alerts and percent-move settings
//! - `cache_cleanup_job` drops expired failure cache entries

pub mod alert_monitoring_job;
pub mod cache_cleanup_job;
