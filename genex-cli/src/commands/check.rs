use crate::commands::{load_model, OutputFormat};
use crate::output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use color_eyre::Result;

use genex_engine::{CheckerConfig, ModelChecker};

/// Check that every target property of a model evaluates
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Build model YAML file
    #[arg(long, value_name = "FILE")]
    pub model: PathBuf,

    /// Compile language set during evaluation
    #[arg(long)]
    pub language: Option<String>,

    /// Maximum evaluations in flight (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub jobs: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn execute(args: CheckArgs) -> Result<()> {
    let model = Arc::new(load_model(Some(args.model.as_path()))?);

    output::status(
        "Checking",
        &format!(
            "{} targets, {} configurations",
            model.targets().count(),
            model.configurations().len().max(1)
        ),
    );

    let checker = ModelChecker::new(CheckerConfig {
        max_parallel: args.jobs,
        language: args.language.clone(),
    });
    let report = checker.check(model).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            output::section("Properties");
            for summary in &report.summaries {
                let mut notes = Vec::new();
                if summary.config_sensitive {
                    notes.push("config".to_string());
                }
                if summary.head_sensitive {
                    notes.push("head".to_string());
                }
                if !summary.depends_on.is_empty() {
                    let deps: Vec<&str> = summary.depends_on.iter().map(String::as_str).collect();
                    notes.push(format!("depends on {}", deps.join(", ")));
                }

                let line = format!("{}.{}", summary.target, summary.property);
                if notes.is_empty() {
                    output::property(&line);
                } else {
                    output::property(&format!("{} ({})", line, notes.join("; ")));
                }
            }

            for failure in &report.failures {
                let config = if failure.config.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", failure.config)
                };
                output::property_failed(&format!("{}.{}{}", failure.target, failure.property, config));
                for line in failure.error.lines() {
                    output::error(&format!("  {}", line));
                }
            }

            if report.warnings > 0 {
                output::warning(&format!("{} warning(s)", report.warnings));
            }
        }
    }

    if !report.success() {
        output::summary(
            false,
            &format!(
                "{} of {} evaluations failed",
                report.failures.len(),
                report.evaluated
            ),
        );
        std::process::exit(1);
    }

    output::summary(true, &format!("{} evaluations succeeded", report.evaluated));
    Ok(())
}
