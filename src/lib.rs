pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod pipeline;
pub mod playlist;
pub mod services;
pub mod utils;
