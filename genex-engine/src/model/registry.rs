// Target Registry
// The contract through which the engine reads the build target graph it does not own

use serde::Serialize;

use std::fmt;

/// Opaque handle to a target, resolved through a [`TargetRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(u32);

impl TargetId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which file of a target an artifact query refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The file produced by the build (executable, library)
    Runtime,
    /// The file passed to the linker (import library for Windows DLLs)
    Linker,
}

/// Read-only view of the target graph
///
/// Implementations must tolerate concurrent reads: distinct compiled
/// expressions may be evaluated on different threads against one registry.
pub trait TargetRegistry: Send + Sync {
    /// Resolve a target (or alias) name
    fn resolve_target(&self, name: &str) -> Option<TargetId>;

    /// Canonical name of a resolved target
    fn target_name(&self, target: TargetId) -> Option<&str>;

    /// Raw, unevaluated property value for a configuration
    fn get_property(&self, target: TargetId, name: &str, config: &str) -> Option<String>;

    /// Whether a property's value varies across configurations by nature
    fn is_config_dependent_property(&self, _target: TargetId, name: &str, config: &str) -> bool {
        default_config_dependent(name, config)
    }

    /// Full path of a target artifact; `None` for targets that produce no file
    fn artifact_path(&self, _target: TargetId, _config: &str, _kind: ArtifactKind) -> Option<String> {
        None
    }

    /// Object files compiled for a target
    fn object_files(&self, _target: TargetId, _config: &str) -> Vec<String> {
        Vec::new()
    }

    fn platform_id(&self) -> Option<String> {
        None
    }

    fn compiler_id(&self, _language: &str) -> Option<String> {
        None
    }

    fn compiler_version(&self, _language: &str) -> Option<String> {
        None
    }

    /// Standard a compiler uses when a target does not request one
    fn default_standard(&self, _language: &str) -> Option<String> {
        None
    }
}

/// Name used in diagnostics for a target handle
pub fn display_name(registry: &dyn TargetRegistry, target: TargetId) -> String {
    registry
        .target_name(target)
        .map(str::to_string)
        .unwrap_or_else(|| target.to_string())
}

/// Default rule for configuration-dependent properties
pub fn default_config_dependent(name: &str, config: &str) -> bool {
    if name.contains("LOCATION")
        || name.ends_with("_POSTFIX")
        || name.starts_with("MAP_IMPORTED_CONFIG_")
    {
        return true;
    }

    if config.is_empty() {
        return false;
    }

    let suffix = format!("_{}", config.to_ascii_uppercase());
    name.len() > suffix.len() && name.ends_with(&suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_dependent() {
        assert!(default_config_dependent("IMPORTED_LOCATION", ""));
        assert!(default_config_dependent("IMPORTED_LOCATION_DEBUG", "Debug"));
        assert!(default_config_dependent("DEBUG_POSTFIX", ""));
        assert!(default_config_dependent("MAP_IMPORTED_CONFIG_RELEASE", ""));
        assert!(default_config_dependent("OUTPUT_NAME_RELEASE", "release"));

        assert!(!default_config_dependent("COMPILE_DEFINITIONS", "Debug"));
        assert!(!default_config_dependent("OUTPUT_NAME_RELEASE", "Debug"));
        assert!(!default_config_dependent("_DEBUG", "Debug"));
    }

    #[test]
    fn test_target_id_display() {
        assert_eq!(TargetId::new(3).to_string(), "#3");
        assert_eq!(TargetId::new(3).index(), 3);
    }
}
