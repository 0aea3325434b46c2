// DAG Checker
// Persistent chain of property lookups in progress, used to reject cycles

use crate::error::{CycleError, CycleFrame};
use crate::model::registry::{display_name, TargetId, TargetRegistry};

use std::sync::Arc;

#[derive(Debug)]
struct Frame {
    target: TargetId,
    property: String,
    config: String,
    transitive_only: bool,
    parent: Option<Arc<Frame>>,
}

/// Immutable chain of (target, property, config) frames
///
/// Pushing returns a new checker sharing the existing chain, so a branch
/// that returns keeps the chain it was handed untouched.
#[derive(Debug, Clone, Default)]
pub struct DagChecker {
    head: Option<Arc<Frame>>,
}

impl DagChecker {
    /// An empty chain
    pub fn root() -> Self {
        Self::default()
    }

    /// Enter a property lookup
    pub fn push(
        &self,
        registry: &dyn TargetRegistry,
        target: TargetId,
        property: &str,
        config: &str,
    ) -> Result<Self, CycleError> {
        self.push_frame(registry, target, property, config, false)
    }

    /// Enter a link-list lookup made only to collect transitive usage requirements
    pub fn push_transitive(
        &self,
        registry: &dyn TargetRegistry,
        target: TargetId,
        property: &str,
        config: &str,
    ) -> Result<Self, CycleError> {
        self.push_frame(registry, target, property, config, true)
    }

    fn push_frame(
        &self,
        registry: &dyn TargetRegistry,
        target: TargetId,
        property: &str,
        config: &str,
        transitive_only: bool,
    ) -> Result<Self, CycleError> {
        if self.contains(target, property, config) {
            let mut chain = self.frames(registry);
            chain.push(CycleFrame {
                target: display_name(registry, target),
                property: property.to_string(),
                config: config.to_string(),
            });
            return Err(CycleError { chain });
        }

        Ok(Self {
            head: Some(Arc::new(Frame {
                target,
                property: property.to_string(),
                config: config.to_string(),
                transitive_only,
                parent: self.head.clone(),
            })),
        })
    }

    /// The chain without its top frame
    pub fn pop(&self) -> Self {
        Self {
            head: self.head.as_ref().and_then(|frame| frame.parent.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Whether the frame appears anywhere in the chain
    pub fn contains(&self, target: TargetId, property: &str, config: &str) -> bool {
        self.iter()
            .any(|f| f.target == target && f.property == property && f.config == config)
    }

    /// Target and property of the innermost frame
    pub fn top(&self) -> Option<(TargetId, &str)> {
        self.head
            .as_deref()
            .map(|frame| (frame.target, frame.property.as_str()))
    }

    /// Whether the innermost lookup only collects transitive usage requirements
    pub fn is_transitive_only(&self) -> bool {
        self.head.as_deref().is_some_and(|frame| frame.transitive_only)
    }

    fn iter(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
    }

    /// Frames oldest first, with target names resolved
    pub fn frames(&self, registry: &dyn TargetRegistry) -> Vec<CycleFrame> {
        let mut frames: Vec<CycleFrame> = self
            .iter()
            .map(|f| CycleFrame {
                target: display_name(registry, f.target),
                property: f.property.clone(),
                config: f.config.clone(),
            })
            .collect();
        frames.reverse();
        frames
    }
}
