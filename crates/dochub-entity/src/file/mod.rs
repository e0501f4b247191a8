//! File domain entities.

pub mod model;
pub mod summary;
pub mod upload;

pub use model::{CreateFile, FileMeta, FileRecord};
pub use summary::FileSummary;
pub use upload::UploadMeta;
