//! Bundle assembly
//!
//! The bundle is the single FlowTyped-ready artifact: every wrapped module
//! declaration, in discovery order, separated by a blank line. Ordering is
//! whatever discovery produced; the bundle is never re-sorted by module name.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Join wrapped file contents into the bundle text.
pub fn combine(contents: &[String]) -> String {
    contents.join("\n\n")
}

/// Write the bundle, creating its parent directory if absent.
pub fn write_bundle(contents: &[String], bundle_path: &Path) -> Result<()> {
    if let Some(parent) = bundle_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create bundle directory {}", parent.display()))?;
    }
    fs::write(bundle_path, combine(contents))
        .with_context(|| format!("failed to write bundle at {}", bundle_path.display()))
}
