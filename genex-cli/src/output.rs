// Terminal output
// Diagnostic and progress lines for genex commands, written to stderr

use std::io::IsTerminal;

const BOLD: &str = "1";
const RED: &str = "31";
const GREEN: &str = "32";
const YELLOW: &str = "33";
const BLUE: &str = "34";
const MAGENTA: &str = "35";
const DIM: &str = "2";

/// Colour is off when `NO_COLOR` is set or stderr is redirected
fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

fn paint(codes: &[&str], text: &str) -> String {
    if use_color() {
        format!("\x1b[{}m{}\x1b[0m", codes.join(";"), text)
    } else {
        text.to_string()
    }
}

/// Right-aligned progress verb, e.g. `   Loading model.yaml`
pub fn status(verb: &str, message: &str) {
    eprintln!("{} {}", paint(&[BOLD, BLUE], &format!("{:>10}", verb)), message);
}

/// `--- title` separator before a block of property lines
pub fn section(title: &str) {
    eprintln!("{}", paint(&[BOLD], &format!("--- {}", title)));
}

/// A `target.PROPERTY` that evaluated cleanly
pub fn property(line: &str) {
    eprintln!("  {} {}", paint(&[GREEN], "ok"), line);
}

/// A `target.PROPERTY` that failed to evaluate
pub fn property_failed(line: &str) {
    eprintln!("  {} {}", paint(&[BOLD, RED], "FAIL"), line);
}

/// Final summary line of a run
pub fn summary(passed: bool, message: &str) {
    let tag = if passed {
        paint(&[BOLD, GREEN], "passed:")
    } else {
        paint(&[BOLD, RED], "failed:")
    };
    eprintln!("{} {}", tag, message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", paint(&[BOLD, YELLOW], "warning:"), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", paint(&[BOLD, RED], "error:"), message);
}

/// Backtrace frame under a diagnostic
pub fn frame(location: &str) {
    eprintln!("  {} {}", paint(&[DIM, MAGENTA], "-->"), location);
}
