// Generator Expression Facade
// Parsing entry points and configuration-independent string utilities

use crate::diagnostics::Backtrace;
use crate::expression::compiled::CompiledExpression;

/// How `preprocess` treats interface markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessMode {
    /// Remove every marker together with its content
    StripAll,
    /// Keep `BUILD_INTERFACE` content, drop `INSTALL_INTERFACE`
    BuildInterface,
    /// Keep `INSTALL_INTERFACE` content, drop `BUILD_INTERFACE`
    InstallInterface,
}

const BUILD_INTERFACE_PREFIX: &str = "$<BUILD_INTERFACE:";
const INSTALL_INTERFACE_PREFIX: &str = "$<INSTALL_INTERFACE:";

/// Entry point for parsing generator expressions
#[derive(Debug, Clone, Default)]
pub struct GeneratorExpression {
    backtrace: Backtrace,
}

impl GeneratorExpression {
    pub fn new(backtrace: Backtrace) -> Self {
        Self { backtrace }
    }

    /// Parse text into a compiled expression
    pub fn parse(&self, input: impl Into<String>) -> CompiledExpression {
        CompiledExpression::new(self.backtrace.clone(), input.into())
    }

    /// Parse optional text; `None` is the empty string
    pub fn parse_opt(&self, input: Option<&str>) -> CompiledExpression {
        self.parse(input.unwrap_or_default())
    }

    /// Resolve interface markers without a build context
    ///
    /// With `resolve_relative`, relative entries of kept install-interface
    /// content are prefixed with `<base>/`.
    pub fn preprocess(input: &str, mode: PreprocessMode, resolve_relative: Option<&str>) -> String {
        let output = match mode {
            PreprocessMode::StripAll => strip_all_markers(input),
            PreprocessMode::BuildInterface | PreprocessMode::InstallInterface => {
                strip_interface(input, mode, resolve_relative)
            }
        };
        Self::strip_empty_list_elements(&output)
    }

    /// Split a `;`-separated list without splitting inside markers
    ///
    /// Empty elements are dropped.
    pub fn split(input: &str) -> Vec<String> {
        let mut items = Vec::new();
        let mut current = String::new();
        let mut nesting = 0usize;
        let mut chars = input.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if input[i..].starts_with("$<") {
                nesting += 1;
                current.push_str("$<");
                chars.next();
                continue;
            }
            match ch {
                '>' if nesting > 0 => {
                    nesting -= 1;
                    current.push(ch);
                }
                ';' if nesting == 0 => {
                    if !current.is_empty() {
                        items.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            items.push(current);
        }
        items
    }

    /// Index of the first `$<` that is eventually closed by a `>`
    pub fn find(input: &str) -> Option<usize> {
        let start = input.find("$<")?;
        input[start..].contains('>').then_some(start)
    }

    /// `[A-Za-z0-9_.:+-]+`
    pub fn is_valid_target_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '+' | '-'))
    }

    /// Remove empty elements from a `;`-separated list
    pub fn strip_empty_list_elements(input: &str) -> String {
        if !input.contains(';') {
            return input.to_string();
        }
        Self::split(input).join(";")
    }
}

/// End of the marker whose content starts at `from`: index of its closing `>`
fn find_marker_end(input: &str, from: usize) -> Option<usize> {
    let mut nesting = 1usize;
    let mut chars = input[from..].char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        let i = from + offset;
        if input[i..].starts_with("$<") {
            nesting += 1;
            chars.next();
            continue;
        }
        if ch == '>' {
            nesting -= 1;
            if nesting == 0 {
                return Some(i);
            }
        }
    }
    None
}

fn strip_all_markers(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    while let Some(offset) = input[last..].find("$<") {
        let start = last + offset;
        output.push_str(&input[last..start]);
        match find_marker_end(input, start + 2) {
            Some(end) => last = end + 1,
            None => {
                // Unterminated: keep the rest as text
                last = start;
                break;
            }
        }
    }

    output.push_str(&input[last..]);
    output
}

fn strip_interface(input: &str, mode: PreprocessMode, resolve_relative: Option<&str>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    loop {
        let rest = &input[last..];
        let build = rest.find(BUILD_INTERFACE_PREFIX);
        let install = rest.find(INSTALL_INTERFACE_PREFIX);

        let (offset, prefix, keep_mode) = match (build, install) {
            (None, None) => break,
            (Some(b), Some(i)) if i < b => (i, INSTALL_INTERFACE_PREFIX, PreprocessMode::InstallInterface),
            (Some(b), _) => (b, BUILD_INTERFACE_PREFIX, PreprocessMode::BuildInterface),
            (None, Some(i)) => (i, INSTALL_INTERFACE_PREFIX, PreprocessMode::InstallInterface),
        };

        let start = last + offset;
        output.push_str(&input[last..start]);

        let content_start = start + prefix.len();
        let Some(end) = find_marker_end(input, content_start) else {
            last = start;
            break;
        };

        if keep_mode == mode {
            let content = &input[content_start..end];
            match (mode, resolve_relative) {
                (PreprocessMode::InstallInterface, Some(base)) => {
                    output.push_str(&prefix_relative_items(content, base));
                }
                _ => output.push_str(content),
            }
        }
        last = end + 1;
    }

    output.push_str(&input[last..]);
    output
}

fn prefix_relative_items(content: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    GeneratorExpression::split(content)
        .into_iter()
        .map(|item| {
            if item.starts_with("$<") || is_absolute_path(&item) {
                item
            } else {
                format!("{}/{}", base, item)
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'/' | b'\\'))
}
