pub mod download;
pub mod upload;

pub use download::download_upload;
pub use upload::{UploadResponse, upload_image};
