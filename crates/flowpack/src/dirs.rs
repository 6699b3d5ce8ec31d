//! Locating the `@types` source directory for a run
//!
//! Installing and locating the types package is process-global work (package
//! manager invocation, working directory); it lives behind this one seam so
//! the pipeline itself never touches process state.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use log::info;

/// Resolve the directory holding the `.d.ts` sources for `package_name`.
///
/// An explicitly given directory wins and is only canonicalized. Otherwise
/// `@types/<package_name>` is installed with `install_script` (by default via
/// npm) and the conventional `node_modules/@types/<package_name>` location is
/// returned.
pub fn resolve_package_dir(
    package_name: &str,
    package_dir: Option<&Path>,
    install_script: Option<&str>,
) -> Result<PathBuf> {
    if let Some(dir) = package_dir {
        return dir
            .canonicalize()
            .with_context(|| format!("package directory {} does not exist", dir.display()));
    }

    info!("Installing @types/{package_name}");
    let script = install_script.map_or_else(
        || format!("npm install --save-dev @types/{package_name}"),
        str::to_owned,
    );
    run_shell(&script)?;

    let installed = Path::new("node_modules").join("@types").join(package_name);
    installed.canonicalize().with_context(|| {
        format!(
            "@types/{package_name} was not installed at {}",
            installed.display()
        )
    })
}

/// Run an install script through the platform shell, inheriting stdio so the
/// package manager's progress stays visible.
fn run_shell(script: &str) -> Result<()> {
    #[cfg(windows)]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", script]);
        command
    };
    #[cfg(not(windows))]
    let mut command = {
        let mut command = Command::new("sh");
        command.args(["-c", script]);
        command
    };

    let status = command
        .status()
        .with_context(|| format!("failed to run install script `{script}`"))?;
    if !status.success() {
        bail!("install script `{script}` exited with {status}");
    }
    Ok(())
}
