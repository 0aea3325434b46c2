// Diagnostic Channel
// Severity-tagged messages with the backtrace of the expression that produced them

use serde::Serialize;

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where an expression was written in the build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    /// Name of the command or property the expression belongs to
    pub context: Option<String>,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

/// Chain of source locations, innermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Backtrace {
    frames: Vec<SourceLocation>,
}

impl Backtrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(file: impl Into<String>, line: usize) -> Self {
        Self {
            frames: vec![SourceLocation {
                file: file.into(),
                line,
                context: None,
            }],
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Some(frame) = self.frames.first_mut() {
            frame.context = Some(context.into());
        }
        self
    }

    /// Push an enclosing location
    pub fn push(mut self, location: SourceLocation) -> Self {
        self.frames.push(location);
        self
    }

    pub fn frames(&self) -> &[SourceLocation] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "  at {}", frame)?;
        }
        Ok(())
    }
}

/// A reported diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub backtrace: Backtrace,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.severity, self.message)?;
        if !self.backtrace.is_empty() {
            write!(f, "{}", self.backtrace)?;
        }
        Ok(())
    }
}

/// Receiver for warnings and errors raised during evaluation
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, severity: Severity, message: &str, backtrace: &Backtrace);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, severity: Severity, message: &str, backtrace: &Backtrace) {
        match severity {
            Severity::Warning => tracing::warn!(backtrace = %backtrace, "{}", message),
            Severity::Error => tracing::error!(backtrace = %backtrace, "{}", message),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the collected diagnostics
    pub fn take(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match self.diagnostics.lock() {
            Ok(guard) => guard.iter().filter(|d| d.severity == severity).count(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .filter(|d| d.severity == severity)
                .count(),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, severity: Severity, message: &str, backtrace: &Backtrace) {
        let diagnostic = Diagnostic {
            severity,
            message: message.to_string(),
            backtrace: backtrace.clone(),
        };
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }
}
