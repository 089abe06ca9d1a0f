use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use startup_orchestrator::args::{Cli, Settings};
use startup_orchestrator::config::OrchestratorConfig;
use startup_orchestrator::orchestrator::{Orchestrator, ServiceFailure};
use startup_orchestrator::report::Reporter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let settings = match cli.into_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            let _ = Cli::command().print_help();
            return ExitCode::FAILURE;
        }
    };
    let reporter = Reporter::new(settings.verbose);
    reporter.trace(format!(
        "Input parameters: {:?}",
        std::env::args().skip(1).collect::<Vec<_>>()
    ));

    match run(&settings, reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ServiceFailure>() {
                Some(failure) => reporter.fatal(
                    &format!("Failed to start the {}", failure.service),
                    &failure.source,
                ),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings, reporter: Reporter) -> anyhow::Result<()> {
    let config = OrchestratorConfig::load(settings.config_path.as_deref())
        .context("Failed to load configuration")?;
    reporter.trace(format!("Configuration: {:?}", config));

    let orchestrator = Orchestrator::from_settings(settings, &config, reporter)?;
    orchestrator.run()?;
    Ok(())
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}]: {}",
                chrono::Local::now().format("%d-%m-%Y %H:%M:%S%.6f"),
                record.args()
            )
        })
        .init();
}
