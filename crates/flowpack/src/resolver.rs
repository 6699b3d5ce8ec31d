//! Module path resolution for generated Flow definitions
//!
//! The resolver is the single source of truth for module identity in a run.
//! It maps absolute output paths back to package-relative module ids and to
//! the externally visible module names used in `declare module` blocks, and
//! it resolves relative import targets found inside a file onto those names.

use std::path::{Component, Path, PathBuf};

/// Extension of TypeScript ambient declaration inputs.
pub const DECLARATION_EXTENSION: &str = ".d.ts";

/// Extension of generated Flow declaration outputs.
pub const FLOW_EXTENSION: &str = ".js.flow";

/// Module id of the package's root declaration file.
pub const INDEX_MODULE: &str = "index";

/// Resolves file paths to module ids and names for one package.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    package_name: String,
    package_dir: PathBuf,
}

impl ModuleResolver {
    pub fn new(package_name: impl Into<String>, package_dir: impl Into<PathBuf>) -> Self {
        Self {
            package_name: package_name.into(),
            package_dir: package_dir.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Turn an absolute path into its package-relative, extension-stripped
    /// module id with `/` separators. Non-absolute specifiers (bare library
    /// imports) are returned unchanged; they resolve globally by name and
    /// must never be re-rooted.
    pub fn relativize(&self, specifier: &str) -> String {
        if !Path::new(specifier).is_absolute() {
            return specifier.to_owned();
        }
        let stripped = specifier.strip_suffix(FLOW_EXTENSION).unwrap_or(specifier);
        to_forward_slashes(&relative_to(Path::new(stripped), &self.package_dir))
    }

    /// Externally visible module name for a module id. The package's root
    /// declaration file declares the package itself rather than `pkg/index`;
    /// nested files get the full relative path, `pkg/lib/foo`.
    pub fn module_name(&self, module_id: &str) -> String {
        if module_id == INDEX_MODULE {
            self.package_name.clone()
        } else {
            format!("{}/{module_id}", self.package_name)
        }
    }

    /// Module name of the file at `output_path`.
    pub fn module_name_of(&self, output_path: &Path) -> String {
        let module_id = self.relativize(&output_path.to_string_lossy());
        self.module_name(&module_id)
    }

    /// Resolve a relative import target found in the file at `output_path`
    /// to the module name of the file it points at.
    pub fn resolve_import(&self, output_path: &Path, import_path: &str) -> String {
        let dir = output_path.parent().unwrap_or_else(|| Path::new(""));
        let resolved = normalize_path(&dir.join(import_path));
        let module_id = self.relativize(&resolved.to_string_lossy());
        self.module_name(&module_id)
    }
}

/// Sibling output path for an input: `.d.ts` swapped for `.js.flow`.
pub fn flow_output_path(input_path: &Path) -> PathBuf {
    let raw = input_path.to_string_lossy();
    match raw.strip_suffix(DECLARATION_EXTENSION) {
        Some(stem) => PathBuf::from(format!("{stem}{FLOW_EXTENSION}")),
        None => input_path.to_path_buf(),
    }
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
/// Imports may reference outputs that have not been written yet, so this must
/// not canonicalize. `..` at the root is clamped, matching how absolute paths
/// resolve on every platform.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Compute `path` relative to `base` without filesystem access, inserting
/// `..` components when `path` lies outside `base`.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if let Ok(suffix) = path.strip_prefix(base) {
        return suffix.to_path_buf();
    }
    let path_components: Vec<Component<'_>> = path.components().collect();
    let base_components: Vec<Component<'_>> = base.components().collect();
    let common = path_components
        .iter()
        .zip(&base_components)
        .take_while(|(a, b)| a == b)
        .count();
    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[common..] {
        relative.push(component);
    }
    relative
}

/// Render a relative path with `/` separators regardless of platform.
fn to_forward_slashes(path: &Path) -> String {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::ParentDir => segments.push("..".to_owned()),
            Component::CurDir => {}
            // Absolute inputs were relativized before this point
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    segments.join("/")
}
