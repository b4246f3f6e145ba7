pub mod types;
pub mod classification;

pub use types::Migr8Error;
pub use classification::ErrorClassification;
