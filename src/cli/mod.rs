//! # CLI Support
//!
//! Runs suites from CI pipelines:
//!
//! ```text
//! restcheck run suite.json --env prod --config config.properties --format json
//! restcheck run suite.json --data testdata.json --group SmokeSuite --parallel
//! ```
//!
//! Exit code 0 when every case passed, 1 when any case failed or errored, 2
//! when the run could not be set up.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use crate::environment::{EnvironmentManager, Properties};
use crate::error::Result;
use crate::http::ApiClient;
use crate::report::RunReport;
use crate::report::store::ReportStore;
use crate::runner::{RunMode, RunOptions, Runner};
use crate::storage;
use crate::test_data::TestData;

#[derive(Debug, Parser)]
#[command(name = "restcheck", version, about = "REST API smoke checks with soft assertions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a suite file.
    Run(RunArgs),
}

/// CLI configuration for `restcheck run`.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Suite JSON file.
    pub suite: PathBuf,

    /// Named environment from the suite to activate.
    #[arg(long = "env")]
    pub environment: Option<String>,

    /// `.properties` file whose entries become variables.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON test data; top-level scalars become variables.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Only run cases in these groups (repeatable).
    #[arg(long = "group")]
    pub groups: Vec<String>,

    /// Run cases concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the JSON report to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Append the run to this SQLite database.
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Output format for CLI reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub async fn execute(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run(args) => match run(&args).await {
            Ok(report) if report.all_passed() => ExitCode::SUCCESS,
            Ok(_) => ExitCode::from(1),
            Err(err) => {
                error!("{err}");
                eprintln!("error: {err}");
                ExitCode::from(2)
            }
        },
    }
}

async fn run(args: &RunArgs) -> Result<RunReport> {
    let mut suite = storage::load_suite(&args.suite)?;
    if let Some(path) = &args.data {
        suite.variables.extend(TestData::load(path)?.variables());
    }

    let mut environment = EnvironmentManager {
        properties: match &args.config {
            Some(path) => Properties::load(path)?,
            None => Properties::default(),
        },
        environments: suite.environments.clone(),
        ..EnvironmentManager::default()
    }
    .with_process_env();
    if let Some(name) = &args.environment {
        environment.select(name)?;
    }

    let client = ApiClient::with_timeout(args.timeout_ms.map(Duration::from_millis))?;
    let options = RunOptions {
        mode: if args.parallel {
            RunMode::Parallel
        } else {
            RunMode::Serial
        },
        groups: args.groups.clone(),
    };

    let report = Runner::new(client, environment, options).run(&suite).await;

    match args.format {
        OutputFormat::Text => println!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    if let Some(path) = &args.report {
        storage::save_report(path, &report)?;
    }
    if let Some(path) = &args.db {
        ReportStore::open(path)?.save_run(&report)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "restcheck",
            "run",
            "suite.json",
            "--env",
            "prod",
            "--group",
            "SmokeSuite",
            "--group",
            "RegressionSuite",
            "--parallel",
            "--format",
            "json",
            "--data",
            "testdata.json",
        ])
        .unwrap();

        let Command::Run(args) = cli.command;
        assert_eq!(args.suite, PathBuf::from("suite.json"));
        assert_eq!(args.environment.as_deref(), Some("prod"));
        assert_eq!(args.groups, vec!["SmokeSuite", "RegressionSuite"]);
        assert!(args.parallel);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.data, Some(PathBuf::from("testdata.json")));
        assert_eq!(args.report, None);
    }

    #[test]
    fn defaults_to_text_output() {
        let cli = Cli::try_parse_from(["restcheck", "run", "suite.json"]).unwrap();
        let Command::Run(args) = cli.command;
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.parallel);
    }

    #[test]
    fn verifies_command_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn missing_suite_is_a_setup_error() {
        let cli = Cli::try_parse_from(["restcheck", "run", "/no/such/suite.json"]).unwrap();
        let Command::Run(args) = cli.command;
        assert!(matches!(run(&args).await, Err(crate::error::Error::Io { .. })));
    }

    #[tokio::test]
    async fn non_object_test_data_is_a_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let suite = dir.path().join("suite.json");
        let data = dir.path().join("data.json");
        std::fs::write(&suite, r#"{"name": "empty"}"#).unwrap();
        std::fs::write(&data, "[1, 2]").unwrap();

        let cli = Cli::try_parse_from([
            "restcheck",
            "run",
            suite.to_str().unwrap(),
            "--data",
            data.to_str().unwrap(),
        ])
        .unwrap();
        let Command::Run(args) = cli.command;
        assert!(matches!(
            run(&args).await,
            Err(crate::error::Error::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn empty_suite_passes_and_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let suite = dir.path().join("suite.json");
        std::fs::write(&suite, r#"{"name": "empty"}"#).unwrap();

        let args = RunArgs {
            suite,
            environment: None,
            config: None,
            data: None,
            groups: Vec::new(),
            parallel: false,
            timeout_ms: None,
            format: OutputFormat::Json,
            report: Some(dir.path().join("report.json")),
            db: Some(dir.path().join("runs.db")),
        };
        let report = run(&args).await.unwrap();
        assert!(report.all_passed());
        assert_eq!(storage::load_report(dir.path().join("report.json")).unwrap(), report);
        assert_eq!(
            ReportStore::open(dir.path().join("runs.db")).unwrap().recent_runs(5).unwrap().len(),
            1
        );
    }
}
