pub mod alerts;
pub mod forecast;
pub mod health;
pub mod market;
pub mod preferences;
pub mod symbols;
pub mod watchlist;
