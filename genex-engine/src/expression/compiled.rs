// Compiled Expression
// A parsed generator expression and everything its evaluations have touched

use crate::diagnostics::{Backtrace, Severity};
use crate::error::EvalResult;
use crate::expression::dag::DagChecker;
use crate::expression::evaluator::{EvaluationEffects, Evaluator, ExpressionContext, Scope};
use crate::expression::features;
use crate::expression::parser::{contains_marker, Expr, ExprParser};
use crate::model::registry::TargetId;

use std::collections::{BTreeMap, BTreeSet};

/// A parsed expression that can be evaluated repeatedly
///
/// Tracking information is the union over every successful evaluation of
/// this instance and is never reset.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    backtrace: Backtrace,
    input: String,
    nodes: Vec<Expr>,
    needs_evaluation: bool,
    evaluate_for_buildsystem: bool,
    effects: EvaluationEffects,
    output: String,
}

impl CompiledExpression {
    pub(crate) fn new(backtrace: Backtrace, input: String) -> Self {
        let nodes = ExprParser::parse_str(&input);
        let needs_evaluation = contains_marker(&nodes);
        Self {
            backtrace,
            input,
            nodes,
            needs_evaluation,
            evaluate_for_buildsystem: false,
            effects: EvaluationEffects::default(),
            output: String::new(),
        }
    }

    /// Evaluate against a context
    ///
    /// Without a `dag`, a fresh cycle-detection chain is started. On failure
    /// the error is reported to the context's diagnostic sink, the stored
    /// output is cleared and no tracking information is recorded.
    pub fn evaluate(
        &mut self,
        context: &ExpressionContext<'_>,
        dag: Option<&DagChecker>,
    ) -> EvalResult<String> {
        if !self.needs_evaluation {
            self.output = self.input.clone();
            return Ok(self.output.clone());
        }

        let scope = Scope::root(context, dag);
        let (result, effects) = {
            let mut evaluator =
                Evaluator::new(context, &self.backtrace).with_buildsystem(self.evaluate_for_buildsystem);
            let result = evaluator.evaluate(&self.nodes, &scope);
            (result, evaluator.into_effects())
        };

        match result {
            Ok(output) => {
                tracing::debug!(
                    input = %self.input,
                    output = %output,
                    config = context.config(),
                    "evaluated generator expression"
                );
                self.effects.merge(effects);
                self.output = output.clone();
                Ok(output)
            }
            Err(err) => {
                context.diagnostics().report(
                    Severity::Error,
                    &format!("Error evaluating generator expression:\n  {}\n{}", self.input, err),
                    &self.backtrace,
                );
                self.output.clear();
                Err(err)
            }
        }
    }

    /// Targets the result depends on for build ordering
    pub fn targets(&self) -> &BTreeSet<TargetId> {
        &self.effects.depend_targets
    }

    /// Every target observed during evaluation
    pub fn all_targets_seen(&self) -> &BTreeSet<TargetId> {
        &self.effects.all_targets_seen
    }

    pub fn seen_target_properties(&self) -> &BTreeSet<String> {
        &self.effects.seen_target_properties
    }

    /// Targets whose source lists influenced the result
    pub fn source_sensitive_targets(&self) -> &BTreeSet<TargetId> {
        &self.effects.source_sensitive_targets
    }

    pub fn had_context_sensitive_condition(&self) -> bool {
        self.effects.had_context_sensitive_condition
    }

    pub fn had_head_sensitive_condition(&self) -> bool {
        self.effects.had_head_sensitive_condition
    }

    /// Strictest standard required of `target` per language
    pub fn max_language_standard(&self, target: TargetId) -> BTreeMap<String, String> {
        let Some(standards) = self.effects.max_language_standard.get(&target) else {
            return BTreeMap::new();
        };
        features::LANGUAGES
            .iter()
            .filter_map(|lang| {
                standards
                    .get(*lang)
                    .map(|standard| (lang.to_string(), standard.clone()))
            })
            .collect()
    }

    /// Record required standards instead of reporting unmet compile features
    pub fn set_evaluate_for_buildsystem(&mut self, enabled: bool) {
        self.evaluate_for_buildsystem = enabled;
    }

    pub fn evaluate_for_buildsystem(&self) -> bool {
        self.evaluate_for_buildsystem
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Output of the last evaluation
    pub fn output(&self) -> &str {
        &self.output
    }

    /// False for text without markers; evaluation is then a pass-through
    pub fn needs_evaluation(&self) -> bool {
        self.needs_evaluation
    }

    pub fn effects(&self) -> &EvaluationEffects {
        &self.effects
    }
}
