/// Descriptor parsing and the launch-facing views of a version chain
pub mod arguments;
pub mod classpath;
pub mod natives;
pub mod rules;
pub mod version_parser;

// Re-export commonly used types
pub use arguments::{substitute_variables, ArgumentContext, EffectiveArguments};
pub use classpath::{maven_to_path, ResolvedArtifact};
pub use natives::extract_natives;
pub use rules::{is_allowed, RuleEnv};
pub use version_parser::{
    Argument, Arguments, AssetIndex, Library, VersionDescriptor,
};
