pub mod aggregate;
pub mod config;
pub mod delta;
pub mod engine;
pub mod export;
pub mod http_cache;
pub mod http_client;
pub mod ledger;
pub mod logging;
pub mod names;
pub mod partition;
pub mod ratings;
pub mod shifts;
pub mod shot;
pub mod sportradar;
pub mod synthetic_feed;
pub mod weight;
pub mod xg;
