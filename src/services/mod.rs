pub mod alert_service;
pub mod failure_cache;
pub mod forecasting_service;
pub mod job_scheduler_service;
pub mod preference_service;
pub mod price_service;
pub mod rate_limiter;
pub mod symbol_service;
pub mod upstream_errors;
pub mod watchlist_service;
