// Expression Interpreter
// One-call parse and evaluate for a fixed target, configuration and language

use crate::diagnostics::{Backtrace, DiagnosticSink};
use crate::error::{EvalError, EvalResult};
use crate::expression::compiled::CompiledExpression;
use crate::expression::dag::DagChecker;
use crate::expression::engine::GeneratorExpression;
use crate::expression::evaluator::ExpressionContext;
use crate::model::registry::{TargetId, TargetRegistry};

/// Evaluates property values of a single target
pub struct ExpressionInterpreter<'a> {
    registry: &'a dyn TargetRegistry,
    diagnostics: Option<&'a dyn DiagnosticSink>,
    head_target: Option<TargetId>,
    config: String,
    language: String,
    backtrace: Backtrace,
    compiled: Option<CompiledExpression>,
}

impl<'a> ExpressionInterpreter<'a> {
    pub fn new(
        registry: &'a dyn TargetRegistry,
        head_target: Option<TargetId>,
        config: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            diagnostics: None,
            head_target,
            config: config.into(),
            language: String::new(),
            backtrace: Backtrace::new(),
            compiled: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Use the named target (or alias) as head target
    pub fn with_target_name(mut self, name: &str) -> EvalResult<Self> {
        let target = self
            .registry
            .resolve_target(name)
            .ok_or_else(|| EvalError::UndefinedTarget(name.to_string()))?;
        self.head_target = Some(target);
        Ok(self)
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn DiagnosticSink) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn with_backtrace(mut self, backtrace: Backtrace) -> Self {
        self.backtrace = backtrace;
        self
    }

    pub fn head_target(&self) -> Option<TargetId> {
        self.head_target
    }

    pub fn config(&self) -> &str {
        &self.config
    }

    /// Expression compiled by the last call, if any
    pub fn compiled(&self) -> Option<&CompiledExpression> {
        self.compiled.as_ref()
    }

    /// Evaluate free-standing text
    pub fn evaluate(&mut self, text: &str) -> EvalResult<String> {
        self.run(text, None)
    }

    /// Evaluate the value of `property` on the head target
    ///
    /// The lookup chain starts with the property's own frame, so a value
    /// that refers back to the same property is rejected as a cycle.
    pub fn evaluate_for_property(&mut self, text: &str, property: &str) -> EvalResult<String> {
        self.run(text, Some(property))
    }

    fn run(&mut self, text: &str, property: Option<&str>) -> EvalResult<String> {
        let mut compiled = GeneratorExpression::new(self.backtrace.clone()).parse(text);

        let dag = match (self.head_target, property) {
            (Some(head), Some(property)) => {
                Some(DagChecker::root().push(self.registry, head, property, &self.config)?)
            }
            _ => None,
        };

        let mut context = ExpressionContext::new(self.registry)
            .with_config(self.config.as_str())
            .with_language(self.language.as_str());
        if let Some(diagnostics) = self.diagnostics {
            context = context.with_diagnostics(diagnostics);
        }
        if let Some(head) = self.head_target {
            context = context.with_head_target(head);
        }

        let result = compiled.evaluate(&context, dag.as_ref());
        self.compiled = Some(compiled);
        result
    }
}
