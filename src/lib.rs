pub mod classify;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod http;
pub mod payloads;
pub mod probe;
pub mod recon;
pub mod reporting;
pub mod scenarios;
pub mod utils;
