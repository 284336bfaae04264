//! GitHub Actions workflow commands and step outputs.
//!
//! Annotations are written to stdout as `::warning::` / `::error::` lines.
//! Outputs are appended to the file named by `GITHUB_OUTPUT`, or printed when
//! running outside Actions.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

/// Emit a warning annotation.
pub(crate) fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

/// Emit an error annotation.
pub(crate) fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Expose `name=value` to later workflow steps.
pub(crate) fn set_output(name: &str, value: &str) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) if !path.is_empty() => append_output(Path::new(&path), name, value),
        _ => {
            println!("{name}={value}");
            Ok(())
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("cannot open output file {}", path.display()))?;

    writeln!(file, "{name}={value}")
        .wrap_err_with(|| format!("cannot write output file {}", path.display()))
}

/// Escape a message so multi-line text survives as one annotation.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
