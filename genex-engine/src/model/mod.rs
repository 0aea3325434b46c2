// Build Model
// Target registry contract and its YAML-backed implementation

pub mod build;
pub mod registry;

pub use build::{BuildModel, CompilerInfo, ModelDocument, PropertyValue, TargetDefinition, TargetType};
pub use registry::{ArtifactKind, TargetId, TargetRegistry};
