use crate::commands::{load_model, OutputFormat};
use crate::output;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use serde::Serialize;

use genex_engine::{
    Backtrace, BuildModel, CollectingSink, CompiledExpression, DagChecker, Diagnostic,
    ExpressionContext, GeneratorExpression, Severity, TargetId, TargetRegistry,
};

/// Evaluate a generator expression
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Expression text, e.g. '$<$<CONFIG:Debug>:-g>'
    pub expression: String,

    /// Build model YAML file describing targets
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Active build configuration
    #[arg(long, default_value = "")]
    pub config: String,

    /// Target whose properties are being evaluated
    #[arg(long, value_name = "TARGET")]
    pub head: Option<String>,

    /// Compile language of the current source (C, CXX, CUDA)
    #[arg(long)]
    pub language: Option<String>,

    /// Suppress warnings
    #[arg(long)]
    pub quiet: bool,

    /// Record required standards instead of failing feature checks
    #[arg(long)]
    pub buildsystem: bool,

    /// Property of the head target being evaluated (enables self-reference checks)
    #[arg(long, value_name = "NAME")]
    pub property: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct EvalReport<'a> {
    output: &'a str,
    targets: Vec<String>,
    all_targets_seen: Vec<String>,
    seen_target_properties: Vec<&'a str>,
    source_sensitive_targets: Vec<String>,
    context_sensitive: bool,
    head_sensitive: bool,
    max_language_standard: BTreeMap<String, String>,
    diagnostics: &'a [Diagnostic],
}

pub fn execute(args: EvalArgs) -> Result<()> {
    let model = load_model(args.model.as_deref())?;

    let head = match &args.head {
        Some(name) => Some(
            model
                .resolve_target(name)
                .ok_or_else(|| eyre!("Unknown target: {}", name))?,
        ),
        None => None,
    };

    let dag = match (head, &args.property) {
        (Some(head), Some(property)) => {
            Some(DagChecker::root().push(&model, head, property, &args.config)?)
        }
        (None, Some(_)) => bail!("--property requires --head"),
        _ => None,
    };

    let sink = CollectingSink::new();
    let mut context = ExpressionContext::new(&model)
        .with_diagnostics(&sink)
        .with_config(args.config.as_str())
        .with_quiet(args.quiet);
    if let Some(language) = &args.language {
        context = context.with_language(language.as_str());
    }
    if let Some(head) = head {
        context = context.with_head_target(head);
    }

    let mut compiled = GeneratorExpression::new(Backtrace::at("<command line>", 1))
        .parse(args.expression.as_str());
    compiled.set_evaluate_for_buildsystem(args.buildsystem);

    let result = compiled.evaluate(&context, dag.as_ref());
    let diagnostics = sink.take();

    match args.format {
        OutputFormat::Text => {
            report_diagnostics(&diagnostics);
            if result.is_err() {
                std::process::exit(1);
            }
            println!("{}", compiled.output());
        }
        OutputFormat::Json => {
            let report = build_report(&model, &compiled, head, &diagnostics);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if result.is_err() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Warning => output::warning(&diagnostic.message),
            Severity::Error => output::error(&diagnostic.message),
        }
        for frame in diagnostic.backtrace.frames() {
            output::frame(&frame.to_string());
        }
    }
}

fn build_report<'a>(
    model: &BuildModel,
    compiled: &'a CompiledExpression,
    head: Option<TargetId>,
    diagnostics: &'a [Diagnostic],
) -> EvalReport<'a> {
    let names = |ids: &std::collections::BTreeSet<TargetId>| -> Vec<String> {
        ids.iter()
            .filter_map(|id| model.target_name(*id).map(str::to_string))
            .collect()
    };

    EvalReport {
        output: compiled.output(),
        targets: names(compiled.targets()),
        all_targets_seen: names(compiled.all_targets_seen()),
        seen_target_properties: compiled
            .seen_target_properties()
            .iter()
            .map(String::as_str)
            .collect(),
        source_sensitive_targets: names(compiled.source_sensitive_targets()),
        context_sensitive: compiled.had_context_sensitive_condition(),
        head_sensitive: compiled.had_head_sensitive_condition(),
        max_language_standard: head
            .map(|head| compiled.max_language_standard(head))
            .unwrap_or_default(),
        diagnostics,
    }
}
