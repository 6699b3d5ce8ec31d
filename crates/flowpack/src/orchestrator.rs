//! Run orchestration: discovery, per-file conversion, output writes, bundling
//!
//! Files are independent of each other until the bundle is assembled, so the
//! expensive middle phase (compile, format, rewrite, wrap, write) runs in
//! parallel with an all-or-nothing join. The first failing file aborts the
//! run; there is no partial-success mode.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::{debug, info};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::combine;
use crate::external::{DefinitionCompiler, Formatter};
use crate::module_wrapper;
use crate::resolver::{DECLARATION_EXTENSION, ModuleResolver, flow_output_path};
use crate::transformations;

/// Drives one bundling run for a resolved package directory.
pub struct BundleOrchestrator<'a> {
    resolver: ModuleResolver,
    compiler: &'a dyn DefinitionCompiler,
    formatter: &'a dyn Formatter,
}

impl std::fmt::Debug for BundleOrchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleOrchestrator")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<'a> BundleOrchestrator<'a> {
    pub fn new(
        resolver: ModuleResolver,
        compiler: &'a dyn DefinitionCompiler,
        formatter: &'a dyn Formatter,
    ) -> Self {
        Self {
            resolver,
            compiler,
            formatter,
        }
    }

    /// Convert every discovered `.d.ts` file, write the `.js.flow` siblings,
    /// and write the bundle. Returns the wrapped outputs in discovery order.
    pub fn run(&self, bundle_path: &Path) -> Result<IndexMap<PathBuf, String>> {
        let input_paths = discover_declaration_files(self.resolver.package_dir())?;
        if input_paths.is_empty() {
            bail!(
                "No .d.ts files were found at {}",
                self.resolver.package_dir().display()
            );
        }
        debug!("discovered {} declaration files", input_paths.len());

        // Read everything up front; a missing file should fail the run before
        // any compiler is invoked or output written.
        let sources: Vec<String> = input_paths
            .par_iter()
            .map(|path| {
                fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))
            })
            .collect::<Result<_>>()?;

        let converted: Vec<(PathBuf, String)> = input_paths
            .par_iter()
            .zip(sources)
            .map(|(input_path, source)| {
                info!("Generating flow types from {}", input_path.display());
                let output_path = flow_output_path(input_path);
                let content = self.convert(&source, &output_path)?;
                fs::write(&output_path, &content)
                    .with_context(|| format!("failed to write {}", output_path.display()))?;
                Ok((output_path, content))
            })
            .collect::<Result<_>>()?;
        // Parallel collect preserves input order, so the map iterates in
        // discovery order.
        let outputs: IndexMap<PathBuf, String> = converted.into_iter().collect();

        info!("Generating bundle at {}", bundle_path.display());
        let contents: Vec<String> = outputs.values().cloned().collect();
        combine::write_bundle(&contents, bundle_path)?;
        Ok(outputs)
    }

    /// Convert one file: compile, format, run the rewrite chain, wrap in the
    /// file's `declare module` block.
    pub fn convert(&self, source: &str, output_path: &Path) -> Result<String> {
        let compiled = self
            .compiler
            .compile(source)
            .with_context(|| format!("flow generation failed for {}", output_path.display()))?;
        // The compiler's output is not reliably formatted; normalize line
        // breaks so the line-anchored rewrites match.
        let formatted = self
            .formatter
            .format(&compiled)
            .with_context(|| format!("formatting failed for {}", output_path.display()))?;
        let rewritten = transformations::apply_rewrites(&formatted, output_path, &self.resolver);
        let module_name = self.resolver.module_name_of(output_path);
        Ok(module_wrapper::wrap_declare_module(&rewritten, &module_name))
    }
}

/// All `.d.ts` files under `package_dir`, recursively, skipping nested
/// `node_modules` directories. Entries are sorted per directory, so discovery
/// order is deterministic for a given tree.
pub fn discover_declaration_files(package_dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(package_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != "node_modules");

    let mut files = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to walk {}", package_dir.display()))?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_string_lossy()
                .ends_with(DECLARATION_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_finds_nested_declarations_and_skips_node_modules() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("lib")).expect("mkdir");
        fs::create_dir_all(dir.path().join("node_modules/dep")).expect("mkdir");
        fs::write(dir.path().join("index.d.ts"), "").expect("write");
        fs::write(dir.path().join("lib/util.d.ts"), "").expect("write");
        fs::write(dir.path().join("lib/util.js"), "").expect("write");
        fs::write(dir.path().join("node_modules/dep/index.d.ts"), "").expect("write");

        let files = discover_declaration_files(dir.path()).expect("discover");
        assert_eq!(
            files,
            vec![
                dir.path().join("index.d.ts"),
                dir.path().join("lib/util.d.ts"),
            ]
        );
    }

    #[test]
    fn discovery_order_is_deterministic() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["zebra.d.ts", "alpha.d.ts", "mid.d.ts"] {
            fs::write(dir.path().join(name), "").expect("write");
        }
        let first = discover_declaration_files(dir.path()).expect("discover");
        let second = discover_declaration_files(dir.path()).expect("discover");
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                dir.path().join("alpha.d.ts"),
                dir.path().join("mid.d.ts"),
                dir.path().join("zebra.d.ts"),
            ]
        );
    }
}
