//! Installation, verification and cleanup of Minecraft game files.
//!
//! The engine resolves a version's inheritance chain, checks every required
//! file against its published SHA-1, fetches what is missing through a bounded
//! worker pool and reclaims files no loaded version references anymore.

pub mod game;

pub use game::installer::config::EngineConfig;
pub use game::installer::error::InstallError;
pub use game::installer::{
    cleanup, install, install_all, list_available, list_installed, remove, AvailableVersion,
};
pub use game::versions::{CleanupReport, VersionManager};
