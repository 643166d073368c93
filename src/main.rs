//! reqlint entry point
//!
//! Exit codes: 0 when no error-severity findings, 1 when findings at
//! error severity exist, 2 when the run itself failed (bad paths,
//! unreadable files, registry failures).

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use reqlint::cli::CliArgs;
use reqlint::lint::LintFilter;
use reqlint::manifest::{detect_manifests, ManifestInfo};
use reqlint::orchestrator::Orchestrator;
use reqlint::output::{create_formatter, OutputConfig};
use reqlint::registry::{HttpClient, PyPiRegistry, RegistryChecker};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: CliArgs) -> Result<ExitCode> {
    let manifests: Vec<ManifestInfo> = if args.has_explicit_files() {
        args.file.iter().map(ManifestInfo::new).collect()
    } else {
        let detected = detect_manifests(&args.path)?;
        if detected.is_empty() {
            anyhow::bail!("no requirements manifests found in {}", args.path.display());
        }
        detected
    };

    let filter = LintFilter::new()
        .with_exclude(args.exclude.clone())
        .with_only(args.only.clone())
        .with_strict(args.strict)
        .with_allow_unpinned(args.allow_unpinned);

    let config = OutputConfig::from_cli(args.json, args.diff, args.verbose, args.quiet);

    let mut orchestrator =
        Orchestrator::new(filter).with_progress(config.progress_enabled());
    if args.check_registry {
        let registry = PyPiRegistry::new(HttpClient::new());
        orchestrator =
            orchestrator.with_registry_checker(RegistryChecker::new(std::sync::Arc::new(registry)));
    }

    let result = orchestrator.run(&manifests).await;

    let formatter = create_formatter(&config);
    print!("{}", formatter.format(&result));

    if !result.errors.is_empty() {
        return Ok(ExitCode::from(2));
    }
    if result.summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
