pub mod command;
pub mod download;
pub mod upload;

pub use command::CommandPipeline;
pub use download::ArtifactDownloader;
pub use upload::{LocalFile, UploadPipeline, supported_mime_type};
