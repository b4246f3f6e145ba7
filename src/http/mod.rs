pub mod client;
pub mod response;

pub use client::{ClientOptions, ProbeClient, DEFAULT_TIMEOUT_SECS};
pub use response::ProbeResponse;
