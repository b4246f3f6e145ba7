//! Concurrent path and file discovery.
//!
//! The engine fans GET probes out over a bounded stream, collects hits into a
//! [`ResultSink`], and stops pulling new work once its cancellation token
//! fires, returning whatever was already found.

pub mod engine;
pub mod results;
pub mod sink;
pub mod wordlist;

pub use engine::{DiscoveryEngine, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH};
pub use results::{DiscoveryResult, EnumerationReport, FileHit, PathStatus, RecursiveResult, SmartEnumeration};
pub use sink::ResultSink;
pub use wordlist::{load_wordlist, parse_wordlist};
