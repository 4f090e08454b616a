pub mod batch;
pub mod downloader;
pub mod inventory;
pub mod traits;
pub mod validator;

pub use batch::BatchDownloader;
pub use downloader::HttpFetcher;
pub use traits::ArtifactFetcher;
pub use validator::needs_fetch;
