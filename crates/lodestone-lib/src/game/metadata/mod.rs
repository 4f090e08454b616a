pub mod manifest;
pub mod types;

pub use manifest::ManifestClient;
pub use types::*;
