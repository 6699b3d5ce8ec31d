use std::fs;
use std::path::Path;

use anyhow::{Result, bail};
use flowpack::external::{DefinitionCompiler, Formatter};
use flowpack::orchestrator::BundleOrchestrator;
use flowpack::resolver::ModuleResolver;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Stands in for flowgen; the fixtures are already valid Flow syntax.
struct IdentityCompiler;

impl DefinitionCompiler for IdentityCompiler {
    fn compile(&self, source: &str) -> Result<String> {
        Ok(source.to_owned())
    }
}

/// Stands in for prettier; the fixtures are already line-normalized.
struct IdentityFormatter;

impl Formatter for IdentityFormatter {
    fn format(&self, source: &str) -> Result<String> {
        Ok(source.to_owned())
    }
}

/// Fails on any input, for abort-policy tests.
struct FailingCompiler;

impl DefinitionCompiler for FailingCompiler {
    fn compile(&self, _source: &str) -> Result<String> {
        bail!("unsupported syntax");
    }
}

fn orchestrator(package_dir: &Path) -> BundleOrchestrator<'static> {
    static COMPILER: IdentityCompiler = IdentityCompiler;
    static FORMATTER: IdentityFormatter = IdentityFormatter;
    BundleOrchestrator::new(
        ModuleResolver::new("bar", package_dir),
        &COMPILER,
        &FORMATTER,
    )
}

#[test]
fn index_file_declares_the_package_itself() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.d.ts"), "import Foo from \"./foo\";\n").unwrap();
    fs::write(dir.path().join("foo.d.ts"), "export type Foo = string;\n").unwrap();

    let bundle_path = dir.path().join("bar.js.flow");
    orchestrator(dir.path()).run(&bundle_path).unwrap();

    let index_output = fs::read_to_string(dir.path().join("index.js.flow")).unwrap();
    assert!(index_output.contains("declare module \"bar\" {"));
    assert!(index_output.contains("  import type * as Foo from \"bar/foo\";"));
}

#[test]
fn nested_files_declare_their_full_module_path() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(
        dir.path().join("lib/util.d.ts"),
        "export interface Thing {}\n",
    )
    .unwrap();

    let bundle_path = dir.path().join("bar.js.flow");
    orchestrator(dir.path()).run(&bundle_path).unwrap();

    let output = fs::read_to_string(dir.path().join("lib/util.js.flow")).unwrap();
    assert_eq!(
        output,
        "// Generated from @types/bar/lib/util using flowpack\n\
         declare module \"bar/lib/util\" {\n\
         \x20 declare export interface Thing {}\n\
         \n\
         }"
    );
}

#[test]
fn bundle_concatenates_outputs_in_discovery_order() {
    let dir = TempDir::new().unwrap();
    // Lexically: alpha, index, zebra; the bundle must follow discovery order,
    // not module-name order (zebra's module name sorts before bar itself).
    fs::write(dir.path().join("alpha.d.ts"), "export type A = 1;\n").unwrap();
    fs::write(dir.path().join("index.d.ts"), "export type I = 2;\n").unwrap();
    fs::write(dir.path().join("zebra.d.ts"), "export type Z = 3;\n").unwrap();

    let bundle_path = dir.path().join("out/bar.js.flow");
    let outputs = orchestrator(dir.path()).run(&bundle_path).unwrap();

    let expected: Vec<String> = outputs.values().cloned().collect();
    let bundle = fs::read_to_string(&bundle_path).unwrap();
    assert_eq!(bundle, expected.join("\n\n"));

    let module_lines: Vec<&str> = bundle
        .lines()
        .filter(|line| line.starts_with("declare module "))
        .collect();
    assert_eq!(
        module_lines,
        vec![
            "declare module \"bar/alpha\" {",
            "declare module \"bar\" {",
            "declare module \"bar/zebra\" {",
        ]
    );
}

#[test]
fn bare_imports_are_never_re_rooted() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("index.d.ts"),
        "import * as lodash from \"lodash\";\n",
    )
    .unwrap();

    let bundle_path = dir.path().join("bar.js.flow");
    orchestrator(dir.path()).run(&bundle_path).unwrap();

    let output = fs::read_to_string(dir.path().join("index.js.flow")).unwrap();
    assert!(output.contains("  import type * as lodash from \"lodash\";"));
    assert!(!output.contains("bar/lodash"));
}

#[test]
fn empty_package_fails_before_any_write() {
    let dir = TempDir::new().unwrap();
    let bundle_path = dir.path().join("out/bar.js.flow");

    let error = orchestrator(dir.path()).run(&bundle_path).unwrap_err();
    assert!(error.to_string().contains("No .d.ts files were found"));
    assert!(!bundle_path.exists());
    assert!(!dir.path().join("out").exists());
}

#[test]
fn compiler_failure_aborts_the_whole_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.d.ts"), "export type A = 1;\n").unwrap();

    static COMPILER: FailingCompiler = FailingCompiler;
    static FORMATTER: IdentityFormatter = IdentityFormatter;
    let orchestrator = BundleOrchestrator::new(
        ModuleResolver::new("bar", dir.path()),
        &COMPILER,
        &FORMATTER,
    );

    let bundle_path = dir.path().join("bar.js.flow");
    let error = orchestrator.run(&bundle_path).unwrap_err();
    assert!(format!("{error:#}").contains("unsupported syntax"));
    assert!(!bundle_path.exists());
    assert!(!dir.path().join("index.js.flow").exists());
}
