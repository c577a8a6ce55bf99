//! # Suite Runner
//!
//! Executes the cases of a [`Suite`] serially or in parallel. Every case
//! iteration owns its own [`SoftAssertions`] session, so parallel cases never
//! observe each other's failures.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};

use crate::collections::{Suite, TestCase};
use crate::environment::EnvironmentManager;
use crate::http::ApiClient;
use crate::report::{RunReport, TestLog};
use crate::testing::SoftAssertions;

/// Execution mode for the collection runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Serial,
    Parallel,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Only cases sharing one of these groups run; empty runs everything.
    pub groups: Vec<String>,
}

pub struct Runner {
    client: ApiClient,
    environment: EnvironmentManager,
    options: RunOptions,
}

/// One scheduled execution of a case with its variables resolved.
struct Job {
    label: String,
    case: TestCase,
    variables: HashMap<String, String>,
}

impl Runner {
    pub fn new(client: ApiClient, environment: EnvironmentManager, options: RunOptions) -> Self {
        Self {
            client,
            environment,
            options,
        }
    }

    pub async fn run(&self, suite: &Suite) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new(&suite.name);
        let jobs = self.plan(suite);
        info!(
            suite = %suite.name,
            cases = jobs.len(),
            mode = ?self.options.mode,
            "starting run"
        );

        match self.options.mode {
            RunMode::Serial => {
                for job in jobs {
                    report.push(run_case(&self.client, job).await);
                }
            }
            RunMode::Parallel => {
                let handles: Vec<_> = jobs
                    .into_iter()
                    .map(|job| {
                        let label = job.label.clone();
                        let client = self.client.clone();
                        (label, tokio::spawn(async move { run_case(&client, job).await }))
                    })
                    .collect();

                for (label, handle) in handles {
                    match handle.await {
                        Ok(log) => report.push(log),
                        Err(err) => {
                            let mut log = TestLog::start_test(label, "");
                            log.error(format!("case did not complete: {err}"));
                            report.push(log);
                        }
                    }
                }
            }
        }

        report.duration_ms = elapsed_ms(started);
        info!("{}", report.summary_line());
        report
    }

    fn plan(&self, suite: &Suite) -> Vec<Job> {
        let base = self.environment.resolve(&suite.variables);
        let mut jobs = Vec::new();

        for case in &suite.cases {
            if !case.matches_groups(&self.options.groups) {
                debug!(case = %case.name, "skipped by group filter");
                continue;
            }
            for row in case.iterations() {
                let label = iteration_label(&case.name, &row);
                let mut variables = base.clone();
                variables.extend(row);
                jobs.push(Job {
                    label,
                    case: case.clone(),
                    variables,
                });
            }
        }

        jobs
    }
}

async fn run_case(client: &ApiClient, job: Job) -> TestLog {
    let started = Instant::now();
    let Job {
        label,
        case,
        variables,
    } = job;

    let mut log = TestLog::start_test(label, case.description.clone());
    let spec = case.request.to_spec(&variables);
    log.info(format!("{} {}", spec.method, spec.url));

    let mut soft = SoftAssertions::new();
    match client.send(&spec).await {
        Ok(response) => {
            log.info(format!("received {}", response.status_line()));
            for assertion in &case.expect {
                let result = assertion.evaluate(&response, &mut soft);
                if result.passed {
                    log.pass(result.message.clone());
                }
                log.assertions.push(result);
            }
            if let Err(failure) = soft.assert_all() {
                log.fail(failure.to_string());
            }
        }
        Err(err) => log.error(err.to_string()),
    }

    log.duration_ms = elapsed_ms(started);
    log
}

fn iteration_label(name: &str, row: &HashMap<String, String>) -> String {
    if row.is_empty() {
        return name.to_string();
    }
    let mut pairs: Vec<_> = row.iter().collect();
    pairs.sort();
    let rendered = pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{name} [{rendered}]")
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suite() -> Suite {
        serde_json::from_value(json!({
            "name": "plan",
            "variables": {"server": "http://localhost"},
            "cases": [
                {"name": "smoke", "groups": ["SmokeSuite"], "request": {"url": "{{server}}/a"}},
                {"name": "rows", "groups": ["RegressionSuite"], "request": {"url": "{{server}}/b"},
                 "data": [{"id": "1", "name": "John"}, {"id": "2", "name": "Jane"}]}
            ]
        }))
        .unwrap()
    }

    fn runner(groups: &[&str]) -> Runner {
        Runner::new(
            ApiClient::new().unwrap(),
            EnvironmentManager::default(),
            RunOptions {
                mode: RunMode::Serial,
                groups: groups.iter().map(|g| g.to_string()).collect(),
            },
        )
    }

    #[test]
    fn plan_expands_data_rows() {
        let jobs = runner(&[]).plan(&suite());
        let labels: Vec<_> = jobs.iter().map(|job| job.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["smoke", "rows [id=1, name=John]", "rows [id=2, name=Jane]"]
        );
        assert_eq!(jobs[2].variables["id"], "2");
        assert_eq!(jobs[2].variables["server"], "http://localhost");
    }

    #[test]
    fn plan_applies_group_filter() {
        let jobs = runner(&["SmokeSuite"]).plan(&suite());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].label, "smoke");
    }

    #[tokio::test]
    async fn unreachable_host_is_an_errored_case() {
        let suite: Suite = serde_json::from_value(json!({
            "name": "offline",
            "cases": [{"name": "bad url", "request": {"url": "http://{missing}/x"}}]
        }))
        .unwrap();

        let report = runner(&[]).run(&suite).await;
        assert_eq!(report.errored, 1);
        assert!(report.tests[0].steps.last().unwrap().message.contains("missing"));
    }
}
