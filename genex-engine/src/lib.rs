// Generator Expression Engine Library
// Evaluation of $<...> generator expressions against a build target graph

pub mod check;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod model;

// Re-export commonly used types
pub use error::{CycleError, CycleFrame, EvalError, EvalResult, ModelError};

// Re-export diagnostics types
pub use diagnostics::{Backtrace, CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};

// Re-export expression types
pub use expression::{
    CompiledExpression, DagChecker, ExpressionContext, ExpressionInterpreter, GeneratorExpression,
    PreprocessMode,
};

// Re-export model types
pub use model::{BuildModel, TargetDefinition, TargetId, TargetRegistry, TargetType};

// Re-export checker types
pub use check::{CheckFailure, CheckReport, CheckerConfig, ModelChecker, PropertySummary};
