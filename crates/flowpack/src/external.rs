//! External collaborator seams: the TS→Flow compiler and the code formatter
//!
//! Both are black boxes to the pipeline. The compiler translates ambient
//! declaration syntax to Flow; the formatter normalizes whitespace and line
//! breaks so the line-anchored rewrites match reliably. The default
//! implementations shell out to the `flowgen` and `prettier` CLIs; tests
//! substitute in-process identity implementations.
//!
//! Failures are not caught per file: a non-zero exit from either tool aborts
//! the whole run.

use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

/// Translates TypeScript ambient declaration text into Flow syntax.
pub trait DefinitionCompiler: Sync {
    fn compile(&self, source: &str) -> Result<String>;
}

/// Normalizes whitespace and line breaks in compiled output.
pub trait Formatter: Sync {
    fn format(&self, source: &str) -> Result<String>;
}

/// Runs the `flowgen` CLI. flowgen only accepts file paths, so each call
/// round-trips through a per-call temp directory.
#[derive(Debug, Clone)]
pub struct FlowgenCommand {
    program: String,
}

impl FlowgenCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FlowgenCommand {
    fn default() -> Self {
        Self::new("flowgen")
    }
}

impl DefinitionCompiler for FlowgenCommand {
    fn compile(&self, source: &str) -> Result<String> {
        let workdir = tempfile::tempdir().context("failed to create flowgen work directory")?;
        let input_path = workdir.path().join("input.d.ts");
        let output_path = workdir.path().join("output.js.flow");
        fs::write(&input_path, source)
            .with_context(|| format!("failed to write {}", input_path.display()))?;

        let output = Command::new(&self.program)
            .arg(&input_path)
            .arg("-o")
            .arg(&output_path)
            .output()
            .with_context(|| format!("failed to run `{}`", self.program))?;
        if !output.status.success() {
            bail!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        fs::read_to_string(&output_path)
            .with_context(|| format!("`{}` produced no output", self.program))
    }
}

/// Pipes text through `prettier --parser babel-flow` via stdin/stdout.
#[derive(Debug, Clone)]
pub struct PrettierFormatter {
    program: String,
}

impl PrettierFormatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for PrettierFormatter {
    fn default() -> Self {
        Self::new("prettier")
    }
}

impl Formatter for PrettierFormatter {
    fn format(&self, source: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(["--parser", "babel-flow"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run `{}`", self.program))?;

        child
            .stdin
            .as_mut()
            .context("formatter stdin unavailable")?
            .write_all(source.as_bytes())
            .with_context(|| format!("failed to write to `{}` stdin", self.program))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program))?;
        if !output.status.success() {
            bail!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        String::from_utf8(output.stdout)
            .with_context(|| format!("`{}` produced non-UTF-8 output", self.program))
    }
}
