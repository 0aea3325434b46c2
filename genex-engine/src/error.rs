// Engine Error Types
// Evaluation failures, cycle reports and build model loading errors

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type for expression evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that abort a generator expression evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("expression did not evaluate to a known generator expression: $<{0}>")]
    UnknownOperator(String),

    #[error("$<{operator}> expects {expected}, got {actual} parameter(s)")]
    ArityMismatch {
        operator: String,
        expected: String,
        actual: usize,
    },

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("target \"{0}\" not found")]
    UndefinedTarget(String),

    #[error("$<{operator}> {message}")]
    InvalidArgument { operator: String, message: String },

    #[error("failed to parse expression: {0}")]
    Parse(String),
}

impl EvalError {
    pub fn invalid(operator: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// True for circular property references
    pub fn is_cycle(&self) -> bool {
        matches!(self, EvalError::Cycle(_))
    }
}

/// One (target, property, configuration) entry of a cycle report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleFrame {
    pub target: String,
    pub property: String,
    pub config: String,
}

impl fmt::Display for CycleFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.config.is_empty() {
            write!(f, "{}.{}", self.target, self.property)
        } else {
            write!(f, "{}.{} [{}]", self.target, self.property, self.config)
        }
    }
}

/// Circular property reference detected by the DAG checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Frames from the outermost lookup to the rejected one
    pub chain: Vec<CycleFrame>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<String> = self.chain.iter().map(|frame| frame.to_string()).collect();
        write!(
            f,
            "circular property reference detected:\n  {}",
            chain.join("\n  -> ")
        )
    }
}

impl std::error::Error for CycleError {}

/// Errors raised while loading a build model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("duplicate target: {0}")]
    DuplicateTarget(String),

    #[error("alias '{alias}' refers to unknown target '{target}'")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("invalid target name: '{0}'")]
    InvalidTargetName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_display() {
        let err = CycleError {
            chain: vec![
                CycleFrame {
                    target: "app".to_string(),
                    property: "COMPILE_DEFINITIONS".to_string(),
                    config: "Debug".to_string(),
                },
                CycleFrame {
                    target: "app".to_string(),
                    property: "COMPILE_DEFINITIONS".to_string(),
                    config: "Debug".to_string(),
                },
            ],
        };

        let output = err.to_string();
        assert!(output.contains("circular property reference"));
        assert!(output.contains("app.COMPILE_DEFINITIONS [Debug]\n  -> app.COMPILE_DEFINITIONS"));
    }

    #[test]
    fn test_arity_mismatch_display() {
        let err = EvalError::ArityMismatch {
            operator: "IF".to_string(),
            expected: "exactly 3".to_string(),
            actual: 2,
        };
        assert_eq!(err.to_string(), "$<IF> expects exactly 3, got 2 parameter(s)");
    }

    #[test]
    fn test_cycle_conversion() {
        let err: EvalError = CycleError { chain: Vec::new() }.into();
        assert!(err.is_cycle());
    }
}
