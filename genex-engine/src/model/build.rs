// Build Model
// YAML-described target graph implementing the target registry

use crate::error::ModelError;
use crate::expression::engine::GeneratorExpression;
use crate::model::registry::{ArtifactKind, TargetId, TargetRegistry};

use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// A property value written either as a string or as a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_list_string(&self) -> String {
        match self {
            PropertyValue::Single(s) => s.clone(),
            PropertyValue::List(items) => items.join(";"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Single(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Single(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Executable,
    StaticLibrary,
    SharedLibrary,
    ObjectLibrary,
    InterfaceLibrary,
}

impl TargetType {
    pub fn property_value(self) -> &'static str {
        match self {
            TargetType::Executable => "EXECUTABLE",
            TargetType::StaticLibrary => "STATIC_LIBRARY",
            TargetType::SharedLibrary => "SHARED_LIBRARY",
            TargetType::ObjectLibrary => "OBJECT_LIBRARY",
            TargetType::InterfaceLibrary => "INTERFACE_LIBRARY",
        }
    }
}

/// Compiler description for one language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerInfo {
    pub id: String,
    pub version: Option<String>,
    pub default_standard: Option<String>,
}

/// A target as written in the model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub target_type: TargetType,

    /// Directory receiving the target's artifacts (default: `build`)
    pub output_dir: Option<String>,

    /// Base name of the artifact (default: the target name)
    pub output_name: Option<String>,

    #[serde(default)]
    pub imported: bool,

    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub link_libraries: Vec<String>,

    #[serde(default)]
    pub interface_link_libraries: Vec<String>,

    /// Free-form properties; values may contain generator expressions
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl TargetDefinition {
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target_type,
            output_dir: None,
            output_name: None,
            imported: false,
            sources: Vec::new(),
            link_libraries: Vec::new(),
            interface_link_libraries: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.link_libraries = libraries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_interface_link_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interface_link_libraries = libraries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn imported(mut self) -> Self {
        self.imported = true;
        self
    }
}

/// Root of a model file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub platform: Option<String>,

    #[serde(default)]
    pub compilers: BTreeMap<String, CompilerInfo>,

    #[serde(default)]
    pub configurations: Vec<String>,

    #[serde(default)]
    pub targets: Vec<TargetDefinition>,

    /// Alias name -> real target name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// In-memory target registry
#[derive(Debug, Clone, Default)]
pub struct BuildModel {
    platform: Option<String>,
    compilers: BTreeMap<String, CompilerInfo>,
    configurations: Vec<String>,
    targets: Vec<TargetDefinition>,
    index: HashMap<String, TargetId>,
}

impl BuildModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a model from YAML
    pub fn parse(content: &str) -> Result<Self, ModelError> {
        let document: ModelDocument = serde_yaml::from_str(content)?;
        Self::from_document(document)
    }

    /// Parse a model from a YAML file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn from_document(document: ModelDocument) -> Result<Self, ModelError> {
        let mut model = Self {
            platform: document.platform,
            compilers: document.compilers,
            configurations: document.configurations,
            ..Default::default()
        };

        for target in document.targets {
            model.add_target(target)?;
        }
        for (alias, target) in document.aliases {
            model.add_alias(&alias, &target)?;
        }

        Ok(model)
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_compiler(mut self, language: impl Into<String>, compiler: CompilerInfo) -> Self {
        self.compilers.insert(language.into(), compiler);
        self
    }

    pub fn with_configurations<I, S>(mut self, configurations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configurations = configurations.into_iter().map(Into::into).collect();
        self
    }

    /// Register a target, returning its handle
    pub fn add_target(&mut self, target: TargetDefinition) -> Result<TargetId, ModelError> {
        if !GeneratorExpression::is_valid_target_name(&target.name) {
            return Err(ModelError::InvalidTargetName(target.name));
        }
        if self.index.contains_key(&target.name) {
            return Err(ModelError::DuplicateTarget(target.name));
        }

        let id = TargetId::new(self.targets.len() as u32);
        self.index.insert(target.name.clone(), id);
        self.targets.push(target);
        Ok(id)
    }

    pub fn add_alias(&mut self, alias: &str, target: &str) -> Result<(), ModelError> {
        if !GeneratorExpression::is_valid_target_name(alias) {
            return Err(ModelError::InvalidTargetName(alias.to_string()));
        }
        if self.index.contains_key(alias) {
            return Err(ModelError::DuplicateTarget(alias.to_string()));
        }
        let Some(&id) = self.index.get(target) else {
            return Err(ModelError::UnknownAliasTarget {
                alias: alias.to_string(),
                target: target.to_string(),
            });
        };
        self.index.insert(alias.to_string(), id);
        Ok(())
    }

    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &TargetDefinition)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId::new(i as u32), t))
    }

    pub fn target(&self, id: TargetId) -> Option<&TargetDefinition> {
        self.targets.get(id.index())
    }

    fn is_platform(&self, name: &str) -> bool {
        self.platform
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(name))
    }

    fn artifact_file_name(
        &self,
        target: &TargetDefinition,
        config: &str,
        kind: ArtifactKind,
    ) -> Option<String> {
        let postfix = if config.is_empty() {
            None
        } else {
            target
                .properties
                .get(&format!("{}_POSTFIX", config.to_ascii_uppercase()))
                .map(PropertyValue::as_list_string)
        };
        let base = format!(
            "{}{}",
            target.output_name.as_deref().unwrap_or(&target.name),
            postfix.unwrap_or_default()
        );

        let windows = self.is_platform("Windows");
        let name = match (target.target_type, kind) {
            (TargetType::Executable, ArtifactKind::Runtime) if windows => format!("{}.exe", base),
            (TargetType::Executable, ArtifactKind::Runtime) => base,
            (TargetType::StaticLibrary, _) if windows => format!("{}.lib", base),
            (TargetType::StaticLibrary, _) => format!("lib{}.a", base),
            (TargetType::SharedLibrary, ArtifactKind::Runtime) if windows => {
                format!("{}.dll", base)
            }
            (TargetType::SharedLibrary, ArtifactKind::Linker) if windows => {
                format!("{}.lib", base)
            }
            (TargetType::SharedLibrary, _) if self.is_platform("Darwin") => {
                format!("lib{}.dylib", base)
            }
            (TargetType::SharedLibrary, _) => format!("lib{}.so", base),
            _ => return None,
        };
        Some(name)
    }

    fn output_dir(&self, target: &TargetDefinition, config: &str) -> String {
        let dir = target.output_dir.as_deref().unwrap_or("build");
        if config.is_empty() {
            dir.to_string()
        } else {
            format!("{}/{}", dir, config)
        }
    }

    fn imported_location(
        &self,
        target: &TargetDefinition,
        config: &str,
        kind: ArtifactKind,
    ) -> Option<String> {
        let prefixes: &[&str] = match kind {
            ArtifactKind::Linker => &["IMPORTED_IMPLIB", "IMPORTED_LOCATION"],
            ArtifactKind::Runtime => &["IMPORTED_LOCATION"],
        };
        for prefix in prefixes {
            if !config.is_empty() {
                let key = format!("{}_{}", prefix, config.to_ascii_uppercase());
                if let Some(value) = target.properties.get(&key) {
                    return Some(value.as_list_string());
                }
            }
            if let Some(value) = target.properties.get(*prefix) {
                return Some(value.as_list_string());
            }
        }
        None
    }
}

impl TargetRegistry for BuildModel {
    fn resolve_target(&self, name: &str) -> Option<TargetId> {
        self.index.get(name).copied()
    }

    fn target_name(&self, target: TargetId) -> Option<&str> {
        self.target(target).map(|t| t.name.as_str())
    }

    fn get_property(&self, target: TargetId, name: &str, _config: &str) -> Option<String> {
        let definition = self.target(target)?;

        if let Some(value) = definition.properties.get(name) {
            return Some(value.as_list_string());
        }

        match name {
            "NAME" => Some(definition.name.clone()),
            "TYPE" => Some(definition.target_type.property_value().to_string()),
            "IMPORTED" => Some(if definition.imported { "TRUE" } else { "FALSE" }.to_string()),
            "SOURCES" if !definition.sources.is_empty() => Some(definition.sources.join(";")),
            "LINK_LIBRARIES" if !definition.link_libraries.is_empty() => {
                Some(definition.link_libraries.join(";"))
            }
            "INTERFACE_LINK_LIBRARIES" if !definition.interface_link_libraries.is_empty() => {
                Some(definition.interface_link_libraries.join(";"))
            }
            "OUTPUT_NAME" => definition.output_name.clone(),
            _ => None,
        }
    }

    fn artifact_path(&self, target: TargetId, config: &str, kind: ArtifactKind) -> Option<String> {
        let definition = self.target(target)?;

        if definition.imported {
            return self.imported_location(definition, config, kind);
        }

        let file = self.artifact_file_name(definition, config, kind)?;
        Some(format!("{}/{}", self.output_dir(definition, config), file))
    }

    fn object_files(&self, target: TargetId, config: &str) -> Vec<String> {
        let Some(definition) = self.target(target) else {
            return Vec::new();
        };
        if definition.imported {
            return Vec::new();
        }

        let extension = if self.is_platform("Windows") { "obj" } else { "o" };
        let base = definition.output_dir.as_deref().unwrap_or("build");
        let dir = if config.is_empty() {
            format!("{}/{}.dir", base, definition.name)
        } else {
            format!("{}/{}.dir/{}", base, definition.name, config)
        };

        definition
            .sources
            .iter()
            .filter_map(|source| {
                let stem = Path::new(source).file_stem()?.to_string_lossy().to_string();
                Some(format!("{}/{}.{}", dir, stem, extension))
            })
            .collect()
    }

    fn platform_id(&self) -> Option<String> {
        self.platform.clone()
    }

    fn compiler_id(&self, language: &str) -> Option<String> {
        self.compilers.get(language).map(|c| c.id.clone())
    }

    fn compiler_version(&self, language: &str) -> Option<String> {
        self.compilers.get(language).and_then(|c| c.version.clone())
    }

    fn default_standard(&self, language: &str) -> Option<String> {
        self.compilers
            .get(language)
            .and_then(|c| c.default_standard.clone())
    }
}
