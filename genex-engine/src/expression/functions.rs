// Built-in Operators
// Eager generator expression operators evaluated from already-computed parameters

use crate::error::{EvalError, EvalResult};
use crate::expression::engine::GeneratorExpression;
use crate::expression::evaluator::CallContext;
use crate::expression::operators::Operator;
use crate::model::registry::{ArtifactKind, TargetId};

use regex::Regex;

use std::cmp::Ordering;
use std::collections::HashSet;

/// Registry of built-in operator implementations
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFunctions;

impl BuiltinFunctions {
    pub fn new() -> Self {
        Self
    }

    /// Call a built-in operator
    ///
    /// `args` has already been checked against the operator's arity.
    pub fn call(
        &self,
        op: Operator,
        args: &[String],
        cx: &mut CallContext<'_>,
    ) -> EvalResult<String> {
        match op {
            // Logic
            Operator::One | Operator::BuildInterface => Ok(args[0].clone()),
            Operator::Not => self.fn_not(args),
            Operator::Bool => Ok(bool_str(is_true(&args[0]))),

            // Comparison
            Operator::StrEqual => Ok(bool_str(args[0] == args[1])),
            Operator::Equal => self.fn_equal(args),
            Operator::InList => Ok(bool_str(
                GeneratorExpression::split(&args[1])
                    .iter()
                    .any(|item| *item == args[0]),
            )),
            Operator::VersionLess => self.fn_version(args, |o| o == Ordering::Less),
            Operator::VersionGreater => self.fn_version(args, |o| o == Ordering::Greater),
            Operator::VersionEqual => self.fn_version(args, |o| o == Ordering::Equal),
            Operator::VersionLessEqual => self.fn_version(args, |o| o != Ordering::Greater),
            Operator::VersionGreaterEqual => self.fn_version(args, |o| o != Ordering::Less),

            // Strings
            Operator::LowerCase => Ok(args[0].to_ascii_lowercase()),
            Operator::UpperCase => Ok(args[0].to_ascii_uppercase()),
            Operator::MakeCIdentifier => Ok(make_c_identifier(&args[0])),
            Operator::AngleR => Ok(">".to_string()),
            Operator::Comma => Ok(",".to_string()),
            Operator::Semicolon => Ok(";".to_string()),

            // Lists
            Operator::Join => Ok(GeneratorExpression::split(&args[0]).join(&args[1])),
            Operator::RemoveDuplicates => {
                Ok(remove_duplicates(GeneratorExpression::split(&args[0])).join(";"))
            }
            Operator::Filter => self.fn_filter(args),

            // Context queries
            Operator::Config => self.fn_config(args, cx),
            Operator::PlatformId => Ok(value_or_membership(
                cx.context.registry().platform_id(),
                args,
            )),
            Operator::CCompilerId => Ok(value_or_membership(
                cx.context.registry().compiler_id("C"),
                args,
            )),
            Operator::CxxCompilerId => Ok(value_or_membership(
                cx.context.registry().compiler_id("CXX"),
                args,
            )),
            Operator::CCompilerVersion => Ok(self.fn_compiler_version("C", args, cx)),
            Operator::CxxCompilerVersion => Ok(self.fn_compiler_version("CXX", args, cx)),
            Operator::CompileLanguage => self.fn_compile_language(args, cx),
            Operator::CompileLangAndId => self.fn_compile_lang_and_id(args, cx),

            // Targets
            Operator::TargetName => self.fn_target_name(args),
            Operator::TargetExists => self.fn_target_exists(op, args, cx),
            Operator::TargetNameIfExists => self.fn_target_exists(op, args, cx),
            Operator::TargetFile
            | Operator::TargetFileName
            | Operator::TargetFileDir
            | Operator::TargetLinkerFile
            | Operator::TargetLinkerFileName
            | Operator::TargetLinkerFileDir => self.fn_target_artifact(op, args, cx),
            Operator::TargetObjects => self.fn_target_objects(args, cx),

            // Usage requirements
            Operator::LinkOnly => self.fn_link_only(args, cx),

            Operator::Zero
            | Operator::And
            | Operator::Or
            | Operator::If
            | Operator::InstallInterface
            | Operator::TargetProperty
            | Operator::GenexEval
            | Operator::TargetGenexEval
            | Operator::CompileFeatures => Err(EvalError::invalid(
                op.name(),
                "is evaluated by the expression walker",
            )),
        }
    }

    // =========================================================================
    // Logic and Comparison
    // =========================================================================

    fn fn_not(&self, args: &[String]) -> EvalResult<String> {
        match args[0].as_str() {
            "0" => Ok("1".to_string()),
            "1" => Ok("0".to_string()),
            other => Err(EvalError::invalid(
                "NOT",
                format!("parameter \"{}\" is not '0' or '1'", other),
            )),
        }
    }

    fn fn_equal(&self, args: &[String]) -> EvalResult<String> {
        let mut values = Vec::with_capacity(2);
        for arg in &args[..2] {
            let value = parse_integer(arg).ok_or_else(|| {
                EvalError::invalid("EQUAL", format!("parameter \"{}\" is not a valid integer", arg))
            })?;
            values.push(value);
        }
        Ok(bool_str(values[0] == values[1]))
    }

    fn fn_version<F>(&self, args: &[String], predicate: F) -> EvalResult<String>
    where
        F: Fn(Ordering) -> bool,
    {
        Ok(bool_str(predicate(compare_versions(&args[0], &args[1]))))
    }

    // =========================================================================
    // Lists
    // =========================================================================

    fn fn_filter(&self, args: &[String]) -> EvalResult<String> {
        let include = match args[1].as_str() {
            "INCLUDE" => true,
            "EXCLUDE" => false,
            other => {
                return Err(EvalError::invalid(
                    "FILTER",
                    format!("mode \"{}\" is not INCLUDE or EXCLUDE", other),
                ))
            }
        };

        let regex = Regex::new(&args[2]).map_err(|e| {
            EvalError::invalid(
                "FILTER",
                format!("failed to compile regex \"{}\": {}", args[2], e),
            )
        })?;

        let kept: Vec<String> = GeneratorExpression::split(&args[0])
            .into_iter()
            .filter(|item| regex.is_match(item) == include)
            .collect();
        Ok(kept.join(";"))
    }

    // =========================================================================
    // Context Queries
    // =========================================================================

    fn fn_config(&self, args: &[String], cx: &mut CallContext<'_>) -> EvalResult<String> {
        let config = cx.context.config();
        if args.is_empty() {
            return Ok(config.to_string());
        }

        if let Some(bad) = args.iter().find(|a| !is_config_name(a)) {
            return Err(EvalError::invalid(
                "CONFIG",
                format!("parameter \"{}\" is not a valid configuration name", bad),
            ));
        }

        if config.is_empty() {
            cx.warn("$<CONFIG> evaluated without an active configuration");
        }

        if args.iter().any(|a| a.eq_ignore_ascii_case(config)) {
            return Ok("1".to_string());
        }

        // Imported targets may map the active configuration onto others
        if config.is_empty() {
            return Ok("0".to_string());
        }
        let Some(current) = cx.scope.current else {
            return Ok("0".to_string());
        };
        let registry = cx.context.registry();
        let imported = registry
            .get_property(current, "IMPORTED", config)
            .is_some_and(|v| is_true(&v));
        if !imported {
            return Ok("0".to_string());
        }

        let map_property = format!("MAP_IMPORTED_CONFIG_{}", config.to_ascii_uppercase());
        let mapped = registry
            .get_property(current, &map_property, config)
            .unwrap_or_default();
        let matched = GeneratorExpression::split(&mapped)
            .iter()
            .any(|m| args.iter().any(|a| a.eq_ignore_ascii_case(m)));
        Ok(bool_str(matched))
    }

    fn fn_compiler_version(&self, language: &str, args: &[String], cx: &CallContext<'_>) -> String {
        let version = cx
            .context
            .registry()
            .compiler_version(language)
            .unwrap_or_default();
        match args.first() {
            None => version,
            Some(expected) => bool_str(compare_versions(&version, expected) == Ordering::Equal),
        }
    }

    fn fn_compile_language(&self, args: &[String], cx: &CallContext<'_>) -> EvalResult<String> {
        let language = cx.context.language();
        if language.is_empty() {
            return Err(EvalError::invalid(
                "COMPILE_LANGUAGE",
                "may only be used while compiling sources",
            ));
        }
        if args.is_empty() {
            return Ok(language.to_string());
        }
        Ok(bool_str(args.iter().any(|a| a == language)))
    }

    fn fn_compile_lang_and_id(&self, args: &[String], cx: &CallContext<'_>) -> EvalResult<String> {
        let language = cx.context.language();
        if language.is_empty() {
            return Err(EvalError::invalid(
                "COMPILE_LANG_AND_ID",
                "may only be used while compiling sources",
            ));
        }
        if args[0] != language {
            return Ok("0".to_string());
        }
        let id = cx.context.registry().compiler_id(language);
        Ok(bool_str(
            id.is_some_and(|id| args[1..].iter().any(|a| *a == id)),
        ))
    }

    // =========================================================================
    // Targets
    // =========================================================================

    fn fn_target_name(&self, args: &[String]) -> EvalResult<String> {
        if !GeneratorExpression::is_valid_target_name(&args[0]) {
            return Err(EvalError::invalid(
                "TARGET_NAME",
                format!("parameter \"{}\" is not a valid target name", args[0]),
            ));
        }
        Ok(args[0].clone())
    }

    fn fn_target_exists(
        &self,
        op: Operator,
        args: &[String],
        cx: &mut CallContext<'_>,
    ) -> EvalResult<String> {
        let name = &args[0];
        if name.is_empty() {
            return Err(EvalError::invalid(op.name(), "expects a non-empty target name"));
        }

        let found = cx.context.registry().resolve_target(name);
        if let Some(target) = found {
            cx.effects.record_target(op.tracking(), target);
        }

        Ok(match (op, found) {
            (Operator::TargetExists, found) => bool_str(found.is_some()),
            (_, Some(_)) => name.clone(),
            (_, None) => String::new(),
        })
    }

    fn resolve_target(
        &self,
        op: Operator,
        name: &str,
        cx: &mut CallContext<'_>,
    ) -> EvalResult<TargetId> {
        if !GeneratorExpression::is_valid_target_name(name) {
            return Err(EvalError::invalid(
                op.name(),
                format!("target name \"{}\" is not valid", name),
            ));
        }
        let target = cx
            .context
            .registry()
            .resolve_target(name)
            .ok_or_else(|| EvalError::UndefinedTarget(name.to_string()))?;
        cx.effects.record_target(op.tracking(), target);
        Ok(target)
    }

    fn fn_target_artifact(
        &self,
        op: Operator,
        args: &[String],
        cx: &mut CallContext<'_>,
    ) -> EvalResult<String> {
        let target = self.resolve_target(op, &args[0], cx)?;
        let kind = match op {
            Operator::TargetLinkerFile
            | Operator::TargetLinkerFileName
            | Operator::TargetLinkerFileDir => ArtifactKind::Linker,
            _ => ArtifactKind::Runtime,
        };

        let path = cx
            .context
            .registry()
            .artifact_path(target, cx.context.config(), kind)
            .ok_or_else(|| {
                EvalError::invalid(
                    op.name(),
                    format!("target \"{}\" does not produce such a file", args[0]),
                )
            })?;

        Ok(match op {
            Operator::TargetFileName | Operator::TargetLinkerFileName => path
                .rsplit_once('/')
                .map(|(_, file)| file.to_string())
                .unwrap_or_else(|| path.clone()),
            Operator::TargetFileDir | Operator::TargetLinkerFileDir => path
                .rsplit_once('/')
                .map(|(dir, _)| dir.to_string())
                .unwrap_or_else(|| ".".to_string()),
            _ => path,
        })
    }

    fn fn_target_objects(&self, args: &[String], cx: &mut CallContext<'_>) -> EvalResult<String> {
        let target = self.resolve_target(Operator::TargetObjects, &args[0], cx)?;
        cx.effects.source_sensitive_targets.insert(target);
        Ok(cx
            .context
            .registry()
            .object_files(target, cx.context.config())
            .join(";"))
    }

    // =========================================================================
    // Usage Requirements
    // =========================================================================

    fn fn_link_only(&self, args: &[String], cx: &CallContext<'_>) -> EvalResult<String> {
        if cx.scope.dag.is_empty() {
            return Err(EvalError::invalid(
                "LINK_ONLY",
                "may only be used in link-related target properties",
            ));
        }
        if cx.scope.dag.is_transitive_only() {
            return Ok(String::new());
        }
        Ok(args[0].clone())
    }
}

fn bool_str(value: bool) -> String {
    let s = if value { "1" } else { "0" };
    s.to_string()
}

/// Zero parameters: the value itself; otherwise whether it is listed
fn value_or_membership(value: Option<String>, args: &[String]) -> String {
    if args.is_empty() {
        return value.unwrap_or_default();
    }
    bool_str(value.is_some_and(|v| args.iter().any(|a| *a == v)))
}

fn is_config_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Truthiness of a string
pub fn is_true(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    match upper.as_str() {
        "" | "0" | "OFF" | "NO" | "FALSE" | "N" | "IGNORE" | "NOTFOUND" => false,
        "1" | "ON" | "YES" | "TRUE" | "Y" => true,
        _ if upper.ends_with("-NOTFOUND") => false,
        _ => value.parse::<f64>().map(|n| n != 0.0).unwrap_or(true),
    }
}

/// Parse an integer with an optional sign and `0x`, `0b` or `0` radix prefix
pub fn parse_integer(value: &str) -> Option<i64> {
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let lower = rest.to_ascii_lowercase();
    let (radix, digits) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex.to_string())
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin.to_string())
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, lower[1..].to_string())
    } else {
        (10, lower)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let magnitude = i64::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Compare dotted versions numerically; missing components count as zero
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = version_components(a);
    let right = version_components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn version_components(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

pub fn make_c_identifier(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 1);
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        out.push('_');
    }
    out.extend(
        value
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    out
}

/// Keep the first occurrence of each item
pub fn remove_duplicates(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Backtrace, CollectingSink, Severity};
    use crate::expression::evaluator::{EvaluationEffects, ExpressionContext, Scope};
    use crate::model::build::{BuildModel, CompilerInfo, TargetDefinition, TargetType};
    use crate::model::registry::TargetRegistry;

    fn make_model() -> BuildModel {
        let mut model = BuildModel::new()
            .with_platform("Linux")
            .with_compiler(
                "CXX",
                CompilerInfo {
                    id: "GNU".to_string(),
                    version: Some("12.2.0".to_string()),
                    default_standard: Some("17".to_string()),
                },
            )
            .with_compiler(
                "C",
                CompilerInfo {
                    id: "Clang".to_string(),
                    version: Some("16.0".to_string()),
                    default_standard: None,
                },
            );
        model
            .add_target(
                TargetDefinition::new("net", TargetType::SharedLibrary)
                    .with_output_dir("out")
                    .with_sources(["net.cpp", "sub/socket.cpp"]),
            )
            .unwrap();
        model
            .add_target(
                TargetDefinition::new("ext", TargetType::SharedLibrary)
                    .imported()
                    .with_property("IMPORTED_LOCATION_RELEASE", "/opt/ext/libext.so")
                    .with_property("MAP_IMPORTED_CONFIG_COVERAGE", "Release"),
            )
            .unwrap();
        model
            .add_target(TargetDefinition::new("headers", TargetType::InterfaceLibrary))
            .unwrap();
        model
    }

    struct Call<'m> {
        model: &'m BuildModel,
        config: &'static str,
        language: &'static str,
        head: Option<&'static str>,
    }

    impl<'m> Call<'m> {
        fn new(model: &'m BuildModel) -> Self {
            Self {
                model,
                config: "Debug",
                language: "",
                head: None,
            }
        }

        fn run(&self, op: Operator, args: &[&str]) -> (EvalResult<String>, EvaluationEffects) {
            let mut ctx = ExpressionContext::new(self.model)
                .with_config(self.config)
                .with_language(self.language)
                .with_quiet(true);
            if let Some(head) = self.head {
                ctx = ctx.with_head_target(self.model.resolve_target(head).unwrap());
            }
            let scope = Scope::root(&ctx, None);
            let backtrace = Backtrace::new();
            let mut effects = EvaluationEffects::default();
            let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
            let result = {
                let mut cx = CallContext {
                    context: &ctx,
                    scope: &scope,
                    effects: &mut effects,
                    backtrace: &backtrace,
                };
                BuiltinFunctions::new().call(op, &args, &mut cx)
            };
            (result, effects)
        }

        fn call(&self, op: Operator, args: &[&str]) -> EvalResult<String> {
            self.run(op, args).0
        }
    }

    #[test]
    fn test_logic_functions() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::Not, &["0"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Not, &["1"]).unwrap(), "0");
        assert!(c.call(Operator::Not, &["yes"]).is_err());
        assert_eq!(c.call(Operator::Bool, &["ON"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Bool, &["foo-NOTFOUND"]).unwrap(), "0");
    }

    #[test]
    fn test_is_true() {
        for value in ["1", "ON", "yes", "True", "Y", "42", "0.5", "anything"] {
            assert!(is_true(value), "{} should be true", value);
        }
        for value in ["", "0", "off", "No", "FALSE", "n", "IGNORE", "NOTFOUND", "X-NOTFOUND", "0.0"] {
            assert!(!is_true(value), "{} should be false", value);
        }
    }

    #[test]
    fn test_comparison_functions() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::StrEqual, &["a", "a"]).unwrap(), "1");
        assert_eq!(c.call(Operator::StrEqual, &["a", "A"]).unwrap(), "0");
        assert_eq!(c.call(Operator::Equal, &["0x10", "16"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Equal, &["010", "8"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Equal, &["-0b11", "-3"]).unwrap(), "1");
        assert!(c.call(Operator::Equal, &["ten", "10"]).is_err());
        assert_eq!(c.call(Operator::InList, &["b", "a;b;c"]).unwrap(), "1");
        assert_eq!(c.call(Operator::InList, &["d", "a;b;c"]).unwrap(), "0");
    }

    #[test]
    fn test_version_functions() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::VersionLess, &["1.2", "1.10"]).unwrap(), "1");
        assert_eq!(c.call(Operator::VersionEqual, &["1.2", "1.2.0"]).unwrap(), "1");
        assert_eq!(c.call(Operator::VersionGreater, &["2", "1.9.9"]).unwrap(), "1");
        assert_eq!(c.call(Operator::VersionLessEqual, &["1.0", "1"]).unwrap(), "1");
        assert_eq!(c.call(Operator::VersionGreaterEqual, &["0.9", "1"]).unwrap(), "0");
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("0XfF"), Some(255));
        assert_eq!(parse_integer("09"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("-"), None);
    }

    #[test]
    fn test_string_functions() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::LowerCase, &["MiXeD"]).unwrap(), "mixed");
        assert_eq!(c.call(Operator::UpperCase, &["MiXeD"]).unwrap(), "MIXED");
        assert_eq!(c.call(Operator::MakeCIdentifier, &["1foo-bar.h"]).unwrap(), "_1foo_bar_h");
        assert_eq!(c.call(Operator::AngleR, &[]).unwrap(), ">");
        assert_eq!(c.call(Operator::Comma, &[]).unwrap(), ",");
        assert_eq!(c.call(Operator::Semicolon, &[]).unwrap(), ";");
    }

    #[test]
    fn test_list_functions() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::Join, &["a;b;c", " -I"]).unwrap(), "a -Ib -Ic");
        assert_eq!(c.call(Operator::RemoveDuplicates, &["a;b;a;c;b"]).unwrap(), "a;b;c");
        assert_eq!(
            c.call(Operator::Filter, &["foo.c;bar.h;baz.c", "INCLUDE", "\\.c$"]).unwrap(),
            "foo.c;baz.c"
        );
        assert_eq!(
            c.call(Operator::Filter, &["foo.c;bar.h;baz.c", "EXCLUDE", "\\.c$"]).unwrap(),
            "bar.h"
        );
        assert!(c.call(Operator::Filter, &["a", "KEEP", "a"]).is_err());
        assert!(c.call(Operator::Filter, &["a", "INCLUDE", "("]).is_err());
    }

    #[test]
    fn test_config() {
        let model = make_model();
        let mut c = Call::new(&model);
        assert_eq!(c.call(Operator::Config, &[]).unwrap(), "Debug");
        assert_eq!(c.call(Operator::Config, &["debug"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Config, &["Release", "Debug"]).unwrap(), "1");
        assert_eq!(c.call(Operator::Config, &["Release"]).unwrap(), "0");
        assert!(c.call(Operator::Config, &["Rel-ease"]).is_err());

        c.config = "Coverage";
        c.head = Some("ext");
        assert_eq!(c.call(Operator::Config, &["Release"]).unwrap(), "1");
        c.head = Some("net");
        assert_eq!(c.call(Operator::Config, &["Release"]).unwrap(), "0");
    }

    #[test]
    fn test_config_warns_without_configuration() {
        let model = make_model();
        let sink = CollectingSink::new();
        let ctx = ExpressionContext::new(&model).with_diagnostics(&sink);
        let scope = Scope::root(&ctx, None);
        let backtrace = Backtrace::new();
        let mut effects = EvaluationEffects::default();
        let mut cx = CallContext {
            context: &ctx,
            scope: &scope,
            effects: &mut effects,
            backtrace: &backtrace,
        };

        let result = BuiltinFunctions::new()
            .call(Operator::Config, &["Debug".to_string()], &mut cx)
            .unwrap();
        assert_eq!(result, "0");
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn test_platform_and_compiler_queries() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::PlatformId, &[]).unwrap(), "Linux");
        assert_eq!(c.call(Operator::PlatformId, &["Windows", "Linux"]).unwrap(), "1");
        assert_eq!(c.call(Operator::CxxCompilerId, &[]).unwrap(), "GNU");
        assert_eq!(c.call(Operator::CCompilerId, &["GNU"]).unwrap(), "0");
        assert_eq!(c.call(Operator::CxxCompilerVersion, &[]).unwrap(), "12.2.0");
        assert_eq!(c.call(Operator::CxxCompilerVersion, &["12.2"]).unwrap(), "1");
        assert_eq!(c.call(Operator::CCompilerVersion, &["15"]).unwrap(), "0");
    }

    #[test]
    fn test_compile_language() {
        let model = make_model();
        let mut c = Call::new(&model);
        assert!(c.call(Operator::CompileLanguage, &[]).is_err());

        c.language = "CXX";
        assert_eq!(c.call(Operator::CompileLanguage, &[]).unwrap(), "CXX");
        assert_eq!(c.call(Operator::CompileLanguage, &["C", "CXX"]).unwrap(), "1");
        assert_eq!(c.call(Operator::CompileLanguage, &["C"]).unwrap(), "0");
        assert_eq!(c.call(Operator::CompileLangAndId, &["CXX", "Clang", "GNU"]).unwrap(), "1");
        assert_eq!(c.call(Operator::CompileLangAndId, &["C", "GNU"]).unwrap(), "0");
    }

    #[test]
    fn test_target_name_and_existence() {
        let model = make_model();
        let c = Call::new(&model);
        assert_eq!(c.call(Operator::TargetName, &["net"]).unwrap(), "net");
        assert!(c.call(Operator::TargetName, &["not a name"]).is_err());

        let (result, effects) = c.run(Operator::TargetExists, &["net"]);
        assert_eq!(result.unwrap(), "1");
        let net = model.resolve_target("net").unwrap();
        assert!(effects.all_targets_seen.contains(&net));
        assert!(effects.depend_targets.is_empty());

        assert_eq!(c.call(Operator::TargetExists, &["ghost"]).unwrap(), "0");
        assert!(c.call(Operator::TargetExists, &[""]).is_err());
        assert_eq!(c.call(Operator::TargetNameIfExists, &["net"]).unwrap(), "net");
        assert_eq!(c.call(Operator::TargetNameIfExists, &["ghost"]).unwrap(), "");
    }

    #[test]
    fn test_target_artifacts() {
        let model = make_model();
        let c = Call::new(&model);

        let (result, effects) = c.run(Operator::TargetFile, &["net"]);
        assert_eq!(result.unwrap(), "out/Debug/libnet.so");
        let net = model.resolve_target("net").unwrap();
        assert!(effects.depend_targets.contains(&net));

        assert_eq!(c.call(Operator::TargetFileName, &["net"]).unwrap(), "libnet.so");
        assert_eq!(c.call(Operator::TargetFileDir, &["net"]).unwrap(), "out/Debug");
        assert_eq!(c.call(Operator::TargetLinkerFile, &["net"]).unwrap(), "out/Debug/libnet.so");

        assert!(matches!(
            c.call(Operator::TargetFile, &["ghost"]).unwrap_err(),
            EvalError::UndefinedTarget(_)
        ));
        assert!(c.call(Operator::TargetFile, &["headers"]).is_err());
    }

    #[test]
    fn test_imported_artifact() {
        let model = make_model();
        let mut c = Call::new(&model);
        c.config = "Release";
        assert_eq!(c.call(Operator::TargetFileName, &["ext"]).unwrap(), "libext.so");
    }

    #[test]
    fn test_target_objects_marks_source_sensitive() {
        let model = make_model();
        let c = Call::new(&model);
        let (result, effects) = c.run(Operator::TargetObjects, &["net"]);
        assert_eq!(
            result.unwrap(),
            "out/net.dir/Debug/net.o;out/net.dir/Debug/socket.o"
        );
        let net = model.resolve_target("net").unwrap();
        assert!(effects.source_sensitive_targets.contains(&net));
    }

    #[test]
    fn test_link_only_requires_property_lookup() {
        let model = make_model();
        let c = Call::new(&model);
        assert!(c.call(Operator::LinkOnly, &["net"]).is_err());
    }

    #[test]
    fn test_walker_operators_rejected() {
        let model = make_model();
        let c = Call::new(&model);
        assert!(c.call(Operator::If, &["1", "a", "b"]).is_err());
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let items = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(remove_duplicates(items), vec!["b".to_string(), "a".to_string()]);
    }
}
