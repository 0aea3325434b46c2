// Model Checker
// Evaluates every property of every target for each configuration of a model

use crate::diagnostics::{Backtrace, CollectingSink, Severity, SourceLocation};
use crate::expression::interpreter::ExpressionInterpreter;
use crate::model::build::{BuildModel, TargetDefinition};
use crate::model::registry::{TargetId, TargetRegistry};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Configuration for model checks
#[derive(Debug, Clone, Default)]
pub struct CheckerConfig {
    /// Maximum evaluations in flight (0 = unlimited)
    pub max_parallel: usize,
    /// Compile language set while evaluating
    pub language: Option<String>,
}

/// A property that failed to evaluate
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CheckFailure {
    pub target: String,
    pub property: String,
    pub config: String,
    pub error: String,
}

/// What a property's value depends on, across all configurations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub target: String,
    pub property: String,
    pub config_sensitive: bool,
    pub head_sensitive: bool,
    pub depends_on: BTreeSet<String>,
}

/// Outcome of checking a model
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub evaluated: usize,
    pub warnings: usize,
    pub failures: Vec<CheckFailure>,
    pub summaries: Vec<PropertySummary>,
}

impl CheckReport {
    pub fn success(&self) -> bool {
        self.failures.is_empty()
    }
}

struct PropertyJob {
    target: TargetId,
    target_name: String,
    property: String,
    config: String,
}

struct PropertyOutcome {
    job: PropertyJob,
    result: Result<String, String>,
    warnings: usize,
    config_sensitive: bool,
    head_sensitive: bool,
    depends_on: BTreeSet<String>,
}

/// Runs one independent evaluation per (configuration, target, property)
#[derive(Debug, Clone, Default)]
pub struct ModelChecker {
    config: CheckerConfig,
}

impl ModelChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Check every property of the model
    ///
    /// A model without configurations is checked once with the empty
    /// configuration name.
    pub async fn check(&self, model: Arc<BuildModel>) -> CheckReport {
        let permits = match self.config.max_parallel {
            0 => Semaphore::MAX_PERMITS,
            n => n,
        };
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut tasks = JoinSet::new();

        for job in collect_jobs(&model) {
            let model = Arc::clone(&model);
            let semaphore = Arc::clone(&semaphore);
            let language = self.config.language.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                tokio::task::spawn_blocking(move || evaluate_property(&model, job, language)).await
            });
        }

        let mut report = CheckReport::default();
        let mut summaries: BTreeMap<(String, String), PropertySummary> = BTreeMap::new();

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) | Err(err) => {
                    tracing::error!(error = %err, "property evaluation task failed");
                    continue;
                }
            };

            report.evaluated += 1;
            report.warnings += outcome.warnings;

            let key = (outcome.job.target_name.clone(), outcome.job.property.clone());
            let summary = summaries.entry(key).or_insert_with(|| PropertySummary {
                target: outcome.job.target_name.clone(),
                property: outcome.job.property.clone(),
                ..Default::default()
            });

            match outcome.result {
                Ok(_) => {
                    summary.config_sensitive |= outcome.config_sensitive;
                    summary.head_sensitive |= outcome.head_sensitive;
                    summary.depends_on.extend(outcome.depends_on);
                }
                Err(error) => report.failures.push(CheckFailure {
                    target: outcome.job.target_name,
                    property: outcome.job.property,
                    config: outcome.job.config,
                    error,
                }),
            }
        }

        report.failures.sort();
        report.summaries = summaries.into_values().collect();

        tracing::debug!(
            evaluated = report.evaluated,
            failures = report.failures.len(),
            "model check finished"
        );
        report
    }
}

fn collect_jobs(model: &BuildModel) -> Vec<PropertyJob> {
    let configs: Vec<String> = if model.configurations().is_empty() {
        vec![String::new()]
    } else {
        model.configurations().to_vec()
    };

    let mut jobs = Vec::new();
    for config in &configs {
        for (target, definition) in model.targets() {
            for property in checked_properties(definition) {
                jobs.push(PropertyJob {
                    target,
                    target_name: definition.name.clone(),
                    property,
                    config: config.clone(),
                });
            }
        }
    }
    jobs
}

fn checked_properties(definition: &TargetDefinition) -> Vec<String> {
    let mut properties: BTreeSet<String> = definition.properties.keys().cloned().collect();
    if !definition.link_libraries.is_empty() {
        properties.insert("LINK_LIBRARIES".to_string());
    }
    if !definition.interface_link_libraries.is_empty() {
        properties.insert("INTERFACE_LINK_LIBRARIES".to_string());
    }
    properties.into_iter().collect()
}

fn evaluate_property(model: &BuildModel, job: PropertyJob, language: Option<String>) -> PropertyOutcome {
    let raw = model
        .get_property(job.target, &job.property, &job.config)
        .unwrap_or_default();

    let sink = CollectingSink::new();
    let backtrace = Backtrace::new().push(SourceLocation {
        file: job.target_name.clone(),
        line: 0,
        context: Some(job.property.clone()),
    });
    let mut interpreter = ExpressionInterpreter::new(model, Some(job.target), job.config.as_str())
        .with_diagnostics(&sink)
        .with_backtrace(backtrace);
    if let Some(language) = language {
        interpreter = interpreter.with_language(language);
    }

    let result = interpreter
        .evaluate_for_property(&raw, &job.property)
        .map_err(|err| err.to_string());

    let (config_sensitive, head_sensitive, depends_on) = match interpreter.compiled() {
        Some(compiled) => (
            compiled.had_context_sensitive_condition(),
            compiled.had_head_sensitive_condition(),
            compiled
                .targets()
                .iter()
                .filter_map(|id| model.target_name(*id).map(str::to_string))
                .collect(),
        ),
        None => (false, false, BTreeSet::new()),
    };

    PropertyOutcome {
        warnings: sink.count(Severity::Warning),
        job,
        result,
        config_sensitive,
        head_sensitive,
        depends_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build::TargetType;

    fn make_model() -> BuildModel {
        let mut model = BuildModel::new().with_configurations(["Debug", "Release"]);
        model
            .add_target(
                TargetDefinition::new("zlib", TargetType::StaticLibrary)
                    .with_property("INTERFACE_INCLUDE_DIRECTORIES", "/zlib/include"),
            )
            .unwrap();
        model
            .add_target(
                TargetDefinition::new("app", TargetType::Executable)
                    .with_link_libraries(["zlib"])
                    .with_property("COMPILE_OPTIONS", "$<$<CONFIG:Debug>:-g>")
                    .with_property("DEPS", "$<TARGET_PROPERTY:zlib,INTERFACE_INCLUDE_DIRECTORIES>")
                    .with_property("BROKEN", "$<NOT_AN_OPERATOR:x>")
                    .with_property("LOOP", "$<TARGET_PROPERTY:LOOP>"),
            )
            .unwrap();
        model
    }

    #[tokio::test]
    async fn test_check_reports_failures_per_config() {
        let report = ModelChecker::default().check(Arc::new(make_model())).await;

        // zlib: 1 property; app: 4 properties + LINK_LIBRARIES; two configs
        assert_eq!(report.evaluated, 12);
        assert!(!report.success());

        let failed: Vec<(&str, &str)> = report
            .failures
            .iter()
            .map(|f| (f.property.as_str(), f.config.as_str()))
            .collect();
        assert_eq!(
            failed,
            vec![("BROKEN", "Debug"), ("BROKEN", "Release"), ("LOOP", "Debug"), ("LOOP", "Release")]
        );
        assert!(report.failures[2].error.contains("circular"));
    }

    #[tokio::test]
    async fn test_check_summaries() {
        let report = ModelChecker::new(CheckerConfig {
            max_parallel: 2,
            language: Some("CXX".to_string()),
        })
        .check(Arc::new(make_model()))
        .await;

        let find = |property: &str| {
            report
                .summaries
                .iter()
                .find(|s| s.target == "app" && s.property == property)
                .unwrap()
        };

        assert!(find("COMPILE_OPTIONS").config_sensitive);
        assert!(!find("COMPILE_OPTIONS").head_sensitive);
        assert_eq!(
            find("DEPS").depends_on,
            BTreeSet::from(["zlib".to_string()])
        );
        assert!(find("LOOP").depends_on.is_empty());
    }

    #[tokio::test]
    async fn test_model_without_configurations() {
        let mut model = BuildModel::new();
        model
            .add_target(
                TargetDefinition::new("tool", TargetType::Executable)
                    .with_property("MODE", "$<IF:$<CONFIG:>,plain,configured>"),
            )
            .unwrap();

        let report = ModelChecker::default().check(Arc::new(model)).await;
        assert_eq!(report.evaluated, 1);
        assert!(report.success());
        assert_eq!(report.warnings, 1);
        assert_eq!(report.summaries.len(), 1);
        assert!(report.summaries[0].config_sensitive);
    }
}
