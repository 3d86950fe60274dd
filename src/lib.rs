pub mod buckets;
pub mod config;
pub mod field_position;
pub mod http_client;
pub mod league_rates;
pub mod output;
pub mod pbp_parquet;
pub mod pipeline;
pub mod play;
pub mod player_rates;
pub mod proxy;
pub mod rate_aggregator;
pub mod season_loader;
pub mod synthetic_pbp;
pub mod team_rates;
