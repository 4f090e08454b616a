pub mod cleanup;
pub mod manager;
pub mod node;

pub use cleanup::CleanupReport;
pub use manager::VersionManager;
pub use node::{NodeState, ValidationStage, VersionNode};
