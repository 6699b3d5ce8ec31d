use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use log::{error, info};

use flowpack::config::Config;
use flowpack::dirs;
use flowpack::external::{FlowgenCommand, PrettierFormatter};
use flowpack::orchestrator::BundleOrchestrator;
use flowpack::resolver::{FLOW_EXTENSION, ModuleResolver};

#[derive(Debug, Parser)]
#[command(
    name = "flowpack",
    version,
    about = "Generate Flow type declarations from @types packages and bundle them for FlowTyped"
)]
struct Cli {
    /// The npm name of the package to generate Flow types for
    #[arg(long)]
    package_name: Option<String>,

    /// Use the .d.ts files at this directory instead of installing
    /// @types/<package-name>
    #[arg(long)]
    package_dir: Option<PathBuf>,

    /// Where to write the FlowTyped bundle
    /// (default: <package-dir>/<package-name>.js.flow)
    #[arg(long)]
    bundle_path: Option<PathBuf>,

    /// Shell command used to install @types/<package-name>
    /// (default: npm install --save-dev @types/<package-name>)
    #[arg(long)]
    types_install_script: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            package_name: self.package_name,
            package_dir: self.package_dir,
            bundle_path: self.bundle_path,
            types_install_script: self.types_install_script,
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(Path::new("."))?.merge(cli.into_config());
    let Some(package_name) = config.package_name else {
        bail!("--package-name is required (or set package-name in flowpack.toml)");
    };

    let package_dir = dirs::resolve_package_dir(
        &package_name,
        config.package_dir.as_deref(),
        config.types_install_script.as_deref(),
    )?;
    info!(
        "Generating flow definitions for {package_name} at {}",
        package_dir.display()
    );

    let bundle_path = config
        .bundle_path
        .unwrap_or_else(|| package_dir.join(format!("{package_name}{FLOW_EXTENSION}")));

    let compiler = FlowgenCommand::default();
    let formatter = PrettierFormatter::default();
    let resolver = ModuleResolver::new(package_name, package_dir);
    BundleOrchestrator::new(resolver, &compiler, &formatter).run(&bundle_path)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
