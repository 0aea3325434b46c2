// Expression Engine Evaluator
// Walks parsed generator expressions against a build context and records what they touched

use crate::diagnostics::{Backtrace, DiagnosticSink, Severity, TracingSink};
use crate::error::{EvalError, EvalResult};
use crate::expression::dag::DagChecker;
use crate::expression::engine::GeneratorExpression;
use crate::expression::features;
use crate::expression::functions::{remove_duplicates, BuiltinFunctions};
use crate::expression::operators::{Operator, Tracking};
use crate::expression::parser::{contains_marker, Expr, ExprParser};
use crate::model::registry::{display_name, TargetId, TargetRegistry};

use std::collections::{BTreeMap, BTreeSet, HashSet};

static TRACING_SINK: TracingSink = TracingSink;

/// Usage requirements collected through the link graph
const TRANSITIVE_PROPERTIES: &[&str] = &[
    "INCLUDE_DIRECTORIES",
    "SYSTEM_INCLUDE_DIRECTORIES",
    "COMPILE_DEFINITIONS",
    "COMPILE_OPTIONS",
    "COMPILE_FEATURES",
];

/// Context for expression evaluation
///
/// Borrowed for the duration of one evaluation and never retained.
pub struct ExpressionContext<'a> {
    registry: &'a dyn TargetRegistry,
    diagnostics: &'a dyn DiagnosticSink,
    config: String,
    language: String,
    head_target: Option<TargetId>,
    current_target: Option<TargetId>,
    quiet: bool,
}

impl<'a> ExpressionContext<'a> {
    pub fn new(registry: &'a dyn TargetRegistry) -> Self {
        Self {
            registry,
            diagnostics: &TRACING_SINK,
            config: String::new(),
            language: String::new(),
            head_target: None,
            current_target: None,
            quiet: false,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: &'a dyn DiagnosticSink) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_head_target(mut self, target: TargetId) -> Self {
        self.head_target = Some(target);
        self
    }

    pub fn with_current_target(mut self, target: TargetId) -> Self {
        self.current_target = Some(target);
        self
    }

    /// Suppress warnings; errors are always reported
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn registry(&self) -> &'a dyn TargetRegistry {
        self.registry
    }

    pub fn diagnostics(&self) -> &'a dyn DiagnosticSink {
        self.diagnostics
    }

    pub fn config(&self) -> &str {
        &self.config
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn head_target(&self) -> Option<TargetId> {
        self.head_target
    }

    /// The target being built; defaults to the head target
    pub fn current_target(&self) -> Option<TargetId> {
        self.current_target.or(self.head_target)
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn warn(&self, message: &str, backtrace: &Backtrace) {
        if !self.quiet {
            self.diagnostics.report(Severity::Warning, message, backtrace);
        }
    }
}

/// Bookkeeping produced by one evaluation
///
/// Merged into the owning compiled expression only when the evaluation
/// succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationEffects {
    pub depend_targets: BTreeSet<TargetId>,
    pub all_targets_seen: BTreeSet<TargetId>,
    pub seen_target_properties: BTreeSet<String>,
    pub source_sensitive_targets: BTreeSet<TargetId>,
    /// Target -> language -> strictest required standard
    pub max_language_standard: BTreeMap<TargetId, BTreeMap<String, String>>,
    pub had_context_sensitive_condition: bool,
    pub had_head_sensitive_condition: bool,
}

impl EvaluationEffects {
    pub fn record_target(&mut self, tracking: Tracking, target: TargetId) {
        match tracking {
            Tracking::None => {}
            Tracking::Observe => {
                self.all_targets_seen.insert(target);
            }
            Tracking::Depend => {
                self.depend_targets.insert(target);
                self.all_targets_seen.insert(target);
            }
        }
    }

    /// Keep the newest of the recorded and the given standard
    pub fn record_required_standard(&mut self, target: TargetId, language: &str, standard: &str) {
        let standards = self.max_language_standard.entry(target).or_default();
        let newest = match standards.get(language) {
            Some(existing) => features::newer(language, existing, standard).to_string(),
            None => standard.to_string(),
        };
        standards.insert(language.to_string(), newest);
    }

    pub fn merge(&mut self, other: EvaluationEffects) {
        self.depend_targets.extend(other.depend_targets);
        self.all_targets_seen.extend(other.all_targets_seen);
        self.seen_target_properties
            .extend(other.seen_target_properties);
        self.source_sensitive_targets
            .extend(other.source_sensitive_targets);
        for (target, standards) in other.max_language_standard {
            for (language, standard) in standards {
                self.record_required_standard(target, &language, &standard);
            }
        }
        self.had_context_sensitive_condition |= other.had_context_sensitive_condition;
        self.had_head_sensitive_condition |= other.had_head_sensitive_condition;
    }
}

/// Targets and lookup chain in effect for one level of evaluation
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub head: Option<TargetId>,
    pub current: Option<TargetId>,
    pub dag: DagChecker,
}

impl Scope {
    /// Top-level scope; an absent chain starts a fresh one
    pub fn root(context: &ExpressionContext<'_>, dag: Option<&DagChecker>) -> Self {
        Self {
            head: context.head_target(),
            current: context.current_target(),
            dag: dag.cloned().unwrap_or_default(),
        }
    }
}

/// What a built-in function may read and record
pub struct CallContext<'e> {
    pub context: &'e ExpressionContext<'e>,
    pub scope: &'e Scope,
    pub effects: &'e mut EvaluationEffects,
    pub backtrace: &'e Backtrace,
}

impl CallContext<'_> {
    pub fn warn(&self, message: &str) {
        self.context.warn(message, self.backtrace);
    }
}

/// Expression evaluator
pub struct Evaluator<'a> {
    context: &'a ExpressionContext<'a>,
    backtrace: &'a Backtrace,
    functions: BuiltinFunctions,
    evaluate_for_buildsystem: bool,
    effects: EvaluationEffects,
    /// (target, interface property) pairs collected by the current link walk
    link_walk: Option<HashSet<(TargetId, String)>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a ExpressionContext<'a>, backtrace: &'a Backtrace) -> Self {
        Self {
            context,
            backtrace,
            functions: BuiltinFunctions::new(),
            evaluate_for_buildsystem: false,
            effects: EvaluationEffects::default(),
            link_walk: None,
        }
    }

    /// Record required standards instead of failing unmet compile features
    pub fn with_buildsystem(mut self, enabled: bool) -> Self {
        self.evaluate_for_buildsystem = enabled;
        self
    }

    pub fn effects(&self) -> &EvaluationEffects {
        &self.effects
    }

    pub fn into_effects(self) -> EvaluationEffects {
        self.effects
    }

    /// Evaluate a sequence of nodes, concatenating their output
    pub fn evaluate(&mut self, nodes: &[Expr], scope: &Scope) -> EvalResult<String> {
        let mut output = String::new();
        for node in nodes {
            output.push_str(&self.eval(node, scope)?);
        }
        Ok(output)
    }

    /// Evaluate a single node
    pub fn eval(&mut self, node: &Expr, scope: &Scope) -> EvalResult<String> {
        match node {
            Expr::Text(text) => Ok(text.clone()),
            Expr::Marker {
                identifier,
                parameters,
            } => self.eval_marker(identifier, parameters.as_deref().unwrap_or(&[]), scope),
        }
    }

    fn eval_marker(
        &mut self,
        identifier: &[Expr],
        parameters: &[Vec<Expr>],
        scope: &Scope,
    ) -> EvalResult<String> {
        let name = self.evaluate(identifier, scope)?;
        let Some(op) = Operator::from_name(&name) else {
            return Err(EvalError::UnknownOperator(name));
        };

        let count = if op.accepts_arbitrary_content() {
            parameters.len().min(1)
        } else {
            parameters.len()
        };
        op.arity().check(op.name(), count)?;

        let result = if op.is_lazy() {
            self.eval_lazy(op, parameters, scope)?
        } else {
            let args = self.evaluate_parameters(op, parameters, scope)?;
            match op {
                Operator::TargetProperty => self.eval_target_property(&args, scope)?,
                Operator::GenexEval => self.eval_text(&args[0], scope)?,
                Operator::TargetGenexEval => self.eval_target_genex(&args, scope)?,
                Operator::CompileFeatures => self.eval_compile_features(&args, scope)?,
                _ => {
                    let mut call = CallContext {
                        context: self.context,
                        scope,
                        effects: &mut self.effects,
                        backtrace: self.backtrace,
                    };
                    self.functions.call(op, &args, &mut call)?
                }
            }
        };

        if op.is_config_sensitive() {
            self.effects.had_context_sensitive_condition = true;
        }
        if op.is_head_sensitive() {
            self.effects.had_head_sensitive_condition = true;
        }

        Ok(result)
    }

    fn evaluate_parameters(
        &mut self,
        op: Operator,
        parameters: &[Vec<Expr>],
        scope: &Scope,
    ) -> EvalResult<Vec<String>> {
        let mut args = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            args.push(self.evaluate(parameter, scope)?);
        }
        if op.accepts_arbitrary_content() && args.len() > 1 {
            args = vec![args.join(",")];
        }
        Ok(args)
    }

    // =========================================================================
    // Lazy Operators
    // =========================================================================

    fn eval_lazy(
        &mut self,
        op: Operator,
        parameters: &[Vec<Expr>],
        scope: &Scope,
    ) -> EvalResult<String> {
        match op {
            // Parameters are never evaluated
            Operator::Zero | Operator::InstallInterface => Ok(String::new()),
            Operator::And => self.eval_logical(op, parameters, scope, "0"),
            Operator::Or => self.eval_logical(op, parameters, scope, "1"),
            Operator::If => self.eval_if(parameters, scope),
            other => Err(EvalError::invalid(other.name(), "has no lazy evaluation")),
        }
    }

    /// `AND`/`OR`: stop at the first parameter equal to `stop`
    fn eval_logical(
        &mut self,
        op: Operator,
        parameters: &[Vec<Expr>],
        scope: &Scope,
        stop: &str,
    ) -> EvalResult<String> {
        for parameter in parameters {
            let value = self.evaluate(parameter, scope)?;
            if value != "0" && value != "1" {
                return Err(EvalError::invalid(
                    op.name(),
                    format!("parameter \"{}\" is not '0' or '1'", value),
                ));
            }
            if value == stop {
                return Ok(value);
            }
        }
        Ok(if stop == "0" { "1" } else { "0" }.to_string())
    }

    fn eval_if(&mut self, parameters: &[Vec<Expr>], scope: &Scope) -> EvalResult<String> {
        let condition = self.evaluate(&parameters[0], scope)?;
        match condition.as_str() {
            "1" => self.evaluate(&parameters[1], scope),
            "0" => self.evaluate(&parameters[2], scope),
            other => Err(EvalError::invalid(
                "IF",
                format!("condition \"{}\" is not '0' or '1'", other),
            )),
        }
    }

    // =========================================================================
    // Recursive Operators
    // =========================================================================

    /// Evaluate text that may itself contain markers
    fn eval_text(&mut self, text: &str, scope: &Scope) -> EvalResult<String> {
        let nodes = ExprParser::parse_str(text);
        if !contains_marker(&nodes) {
            return Ok(text.to_string());
        }
        tracing::trace!(text, "evaluating nested expression");
        self.evaluate(&nodes, scope)
    }

    fn eval_target_genex(&mut self, args: &[String], scope: &Scope) -> EvalResult<String> {
        let target = self.resolve_named(Operator::TargetGenexEval, &args[0])?;
        let nested = Scope {
            head: Some(target),
            current: Some(target),
            dag: scope.dag.clone(),
        };
        self.eval_text(&args[1], &nested)
    }

    /// `COMPILE_FEATURES`: every feature is available to the head target
    ///
    /// `<LANG>_STANDARD` is read through a property lookup, so it may hold
    /// expressions. An empty value falls back to the compiler default.
    fn eval_compile_features(&mut self, args: &[String], scope: &Scope) -> EvalResult<String> {
        let op = Operator::CompileFeatures;
        let head = scope
            .head
            .ok_or_else(|| EvalError::invalid(op.name(), "may only be used with a head target"))?;

        for name in args {
            let feature = features::lookup(name)
                .ok_or_else(|| EvalError::invalid(op.name(), format!("unknown feature \"{}\"", name)))?;

            let property = format!("{}_STANDARD", feature.language);
            let standard = self.lookup_property(head, &property, scope, false)?;
            let available = if standard.is_empty() {
                self.context.registry().default_standard(feature.language)
            } else {
                Some(standard)
            };

            if features::is_satisfied(feature.language, available.as_deref(), feature.standard) {
                continue;
            }

            if self.evaluate_for_buildsystem {
                self.effects
                    .record_required_standard(head, feature.language, feature.standard);
                continue;
            }

            return Ok("0".to_string());
        }

        Ok("1".to_string())
    }

    fn resolve_named(&mut self, op: Operator, name: &str) -> EvalResult<TargetId> {
        if !GeneratorExpression::is_valid_target_name(name) {
            return Err(EvalError::invalid(
                op.name(),
                format!("target name \"{}\" is not valid", name),
            ));
        }
        let target = self
            .context
            .registry()
            .resolve_target(name)
            .ok_or_else(|| EvalError::UndefinedTarget(name.to_string()))?;
        self.effects.record_target(op.tracking(), target);
        Ok(target)
    }

    fn eval_target_property(&mut self, args: &[String], scope: &Scope) -> EvalResult<String> {
        let op = Operator::TargetProperty;

        let (target, property) = match args {
            [property] => {
                let head = scope.head.ok_or_else(|| {
                    EvalError::invalid(op.name(), "with a single parameter requires a head target")
                })?;
                self.effects.had_head_sensitive_condition = true;
                self.effects.record_target(op.tracking(), head);
                (head, property.as_str())
            }
            [name, property] => {
                if name.is_empty() && property.is_empty() {
                    return Err(EvalError::invalid(
                        op.name(),
                        "was called with an empty target name and property name",
                    ));
                }
                if name.is_empty() {
                    return Err(EvalError::invalid(op.name(), "was called with an empty target name"));
                }
                (self.resolve_named(op, name)?, property.as_str())
            }
            _ => {
                return Err(EvalError::ArityMismatch {
                    operator: op.name().to_string(),
                    expected: op.arity().describe(),
                    actual: args.len(),
                })
            }
        };

        if !is_valid_property_name(property) {
            return Err(EvalError::invalid(
                op.name(),
                format!("property name \"{}\" is not valid", property),
            ));
        }

        self.lookup_property(target, property, scope, false)
    }

    /// Read a property and evaluate its value with `target` as the current target
    fn lookup_property(
        &mut self,
        target: TargetId,
        property: &str,
        scope: &Scope,
        transitive_only: bool,
    ) -> EvalResult<String> {
        let context = self.context;
        let registry = context.registry();
        let config = context.config();

        let dag = if transitive_only {
            scope.dag.push_transitive(registry, target, property, config)?
        } else {
            scope.dag.push(registry, target, property, config)?
        };

        self.effects
            .seen_target_properties
            .insert(property.to_string());
        if registry.is_config_dependent_property(target, property, config) {
            self.effects.had_context_sensitive_condition = true;
        }

        tracing::debug!(
            name = %display_name(registry, target),
            property,
            config,
            depth = dag.depth(),
            "looking up target property"
        );

        let nested = Scope {
            head: scope.head,
            current: Some(target),
            dag,
        };

        let raw = registry
            .get_property(target, property, config)
            .unwrap_or_default();
        let value = self.eval_text(&raw, &nested)?;

        let Some((link_property, interface_property)) = transitive_link_property(property) else {
            return Ok(value);
        };

        let mut items = GeneratorExpression::split(&value);

        // The outermost walk owns the visited set; nested walks share it
        let owns_walk = self.link_walk.is_none();
        if owns_walk {
            self.link_walk = Some(HashSet::new());
        }
        let inherited = self.walk_link_dependencies(
            target,
            link_property,
            &interface_property,
            &nested,
        );
        if owns_walk {
            self.link_walk = None;
        }
        items.extend(inherited?);

        Ok(remove_duplicates(items).join(";"))
    }

    /// Collect `interface_property` from every target linked by `target`
    ///
    /// Each (target, property) pair is visited once per walk. A dependency
    /// whose lookup is already in progress is skipped, so mutually linked
    /// libraries are not a cycle.
    fn walk_link_dependencies(
        &mut self,
        target: TargetId,
        link_property: &str,
        interface_property: &str,
        scope: &Scope,
    ) -> EvalResult<Vec<String>> {
        let context = self.context;
        let registry = context.registry();
        let config = context.config();

        let links = self.lookup_property(target, link_property, scope, true)?;
        let mut items = Vec::new();

        for entry in GeneratorExpression::split(&links) {
            let Some(dependency) = registry.resolve_target(&entry) else {
                continue;
            };
            if dependency == target {
                continue;
            }
            self.effects.record_target(Tracking::Observe, dependency);

            if scope.dag.contains(dependency, interface_property, config) {
                continue;
            }
            let first_visit = self
                .link_walk
                .as_mut()
                .map_or(true, |visited| visited.insert((dependency, interface_property.to_string())));
            if !first_visit {
                continue;
            }

            let inherited = self.lookup_property(dependency, interface_property, scope, false)?;
            items.extend(GeneratorExpression::split(&inherited));
        }

        Ok(items)
    }
}

/// `[A-Za-z0-9_]+`
pub fn is_valid_property_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Link list to walk and property to collect from each linked target
fn transitive_link_property(property: &str) -> Option<(&'static str, String)> {
    if let Some(base) = property.strip_prefix("INTERFACE_") {
        return TRANSITIVE_PROPERTIES
            .contains(&base)
            .then(|| ("INTERFACE_LINK_LIBRARIES", property.to_string()));
    }
    TRANSITIVE_PROPERTIES
        .contains(&property)
        .then(|| ("LINK_LIBRARIES", format!("INTERFACE_{}", property)))
}
