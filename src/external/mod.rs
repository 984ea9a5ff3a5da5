pub mod coingecko;
pub mod mock_provider;
pub mod price_provider;
pub mod response_parser;
