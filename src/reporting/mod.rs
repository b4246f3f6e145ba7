pub mod console;
pub mod formatter;
pub mod report;

pub use console::Reporter;
pub use report::{write_report, ScanReport};
