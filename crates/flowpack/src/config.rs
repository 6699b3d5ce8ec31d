//! Run configuration
//!
//! Options mirror the CLI surface. A `flowpack.toml` in the working directory
//! may pre-populate them; values given on the command line take precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "flowpack.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// The npm name of the package whose `@types` definitions are converted
    pub package_name: Option<String>,
    /// Convert the definitions found at this directory instead of installing
    /// `@types/<package-name>`
    pub package_dir: Option<PathBuf>,
    /// Where to write the FlowTyped bundle; defaults to
    /// `<package-dir>/<package-name>.js.flow`
    pub bundle_path: Option<PathBuf>,
    /// Shell command used to install `@types/<package-name>`
    pub types_install_script: Option<String>,
}

impl Config {
    /// Load configuration from `flowpack.toml` under `dir`, if present.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Overlay `overrides` on top of this configuration; set override fields
    /// win.
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            package_name: overrides.package_name.or(self.package_name),
            package_dir: overrides.package_dir.or(self.package_dir),
            bundle_path: overrides.bundle_path.or(self.bundle_path),
            types_install_script: overrides.types_install_script.or(self.types_install_script),
        }
    }
}
