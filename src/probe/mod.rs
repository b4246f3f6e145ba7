pub mod field;
pub mod filename;
pub mod upload;

pub use field::detect_upload_field;
pub use filename::FilenameGenerator;
pub use upload::{UploadProbe, UploadRequest, UploadResult};
