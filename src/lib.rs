pub mod cli_args;
pub mod config;
pub mod encoding;
pub mod error;
pub mod fbref;
pub mod features;
pub mod forest;
pub mod http_cache;
pub mod http_client;
pub mod match_store;
pub mod metrics;
pub mod pairing;
pub mod predictor;
pub mod rolling;
pub mod team_names;

pub use error::PipelineError;
