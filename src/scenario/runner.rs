//! Scenario execution
//!
//! Runs one scenario through its lifecycle:
//! `Pending -> SettingUp -> Running -> {Passed | Failed} -> TornDown`.
//! Setup failures skip the steps entirely; teardown runs in every case,
//! including cancellation by the per-scenario ceiling. Scenarios are
//! isolated — each gets a fresh session — so a failure never cascades.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{stream, StreamExt};
use tracing::{debug, warn};

use crate::browser::Navigator;
use crate::check::{self, AssertionFailure, Matcher};
use crate::common::{Error, HarnessConfig, Result};

use super::config::{Scenario, Step};
use super::ids::{IdSource, UuidSource};
use super::report::RunReport;

/// Final status of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
}

/// Lifecycle phase, tracked for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    SettingUp,
    Running,
    Passed,
    Failed,
    TornDown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::SettingUp => "setting-up",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TornDown => "torn-down",
        };
        f.write_str(name)
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub name: String,
    pub status: ScenarioStatus,
    /// Recorded expectation mismatches (the first one halts the scenario)
    pub failures: Vec<AssertionFailure>,
    /// Non-assertion failure, when one aborted the scenario
    pub error: Option<String>,
    pub steps_run: usize,
    pub steps_total: usize,
    pub duration_ms: u64,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Executes scenarios against the configured application
pub struct ScenarioRunner {
    config: HarnessConfig,
    ids: Arc<dyn IdSource>,
}

impl ScenarioRunner {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            ids: Arc::new(UuidSource),
        }
    }

    /// Replace the unique-id source (deterministic ids for tests)
    pub fn with_id_source(config: HarnessConfig, ids: Arc<dyn IdSource>) -> Self {
        Self { config, ids }
    }

    /// Run one scenario to completion, teardown included
    pub async fn run(&self, scenario: &Scenario) -> ScenarioResult {
        let started = Instant::now();
        let mut phase = Phase::Pending;
        let scenario = scenario.resolved(&self.ids.next_id());
        let steps_total = scenario.steps.len();

        let mut failures = Vec::new();
        let mut error = None;
        let mut steps_run = 0;

        let mut nav = match Navigator::new(&self.config) {
            Ok(nav) => nav,
            Err(e) => {
                return ScenarioResult {
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Failed,
                    failures,
                    error: Some(e.to_string()),
                    steps_run,
                    steps_total,
                    duration_ms: elapsed_ms(started),
                };
            }
        };

        transition(&scenario.name, &mut phase, Phase::SettingUp);
        let ceiling = Duration::from_secs(self.config.timeouts.scenario_secs);
        let outcome = tokio::time::timeout(
            ceiling,
            self.execute(&mut nav, &scenario, &mut phase, &mut steps_run),
        )
        .await;

        let status = match outcome {
            Err(_) => {
                error = Some(
                    Error::ScenarioTimeout(self.config.timeouts.scenario_secs).to_string(),
                );
                ScenarioStatus::Failed
            }
            Ok(Err(Error::Assertion(mut failure))) => {
                failure.scenario = scenario.name.clone();
                failures.push(failure);
                ScenarioStatus::Failed
            }
            Ok(Err(e)) => {
                error = Some(e.to_string());
                ScenarioStatus::Failed
            }
            Ok(Ok(())) => ScenarioStatus::Passed,
        };
        transition(
            &scenario.name,
            &mut phase,
            match status {
                ScenarioStatus::Passed => Phase::Passed,
                ScenarioStatus::Failed => Phase::Failed,
            },
        );

        self.teardown(&mut nav, &scenario).await;
        transition(&scenario.name, &mut phase, Phase::TornDown);

        ScenarioResult {
            name: scenario.name.clone(),
            status,
            failures,
            error,
            steps_run,
            steps_total,
            duration_ms: elapsed_ms(started),
        }
    }

    /// Run scenarios with up to `jobs` in flight, preserving input order
    /// in the report
    pub async fn run_all(&self, scenarios: &[Scenario], jobs: usize) -> RunReport {
        let started = Instant::now();
        let mut indexed: Vec<(usize, ScenarioResult)> =
            stream::iter(scenarios.iter().enumerate())
                .map(|(index, scenario)| async move { (index, self.run(scenario).await) })
                .buffer_unordered(jobs.max(1))
                .collect()
                .await;
        indexed.sort_by_key(|(index, _)| *index);
        let results = indexed.into_iter().map(|(_, result)| result).collect();
        RunReport::new(results, started.elapsed())
    }

    async fn execute(
        &self,
        nav: &mut Navigator,
        scenario: &Scenario,
        phase: &mut Phase,
        steps_run: &mut usize,
    ) -> Result<()> {
        if let Some(setup) = &scenario.setup {
            if let Some(credentials) = &setup.register {
                nav.session_mut().register(credentials).await?;
            }
            if let Some(credentials) = &setup.login {
                nav.session_mut().authenticate(credentials).await?;
            }
            if let Some(path) = &setup.goto {
                nav.goto(path).await?;
            }
        }

        transition(&scenario.name, phase, Phase::Running);
        for (index, step) in scenario.steps.iter().enumerate() {
            self.step(nav, step).await.map_err(|e| match e {
                Error::Assertion(mut failure) => {
                    failure.step = index;
                    Error::Assertion(failure)
                }
                other => other,
            })?;
            *steps_run = index + 1;
        }
        Ok(())
    }

    async fn step(&self, nav: &mut Navigator, step: &Step) -> Result<()> {
        match step {
            Step::Goto { path } => {
                nav.goto(path).await?;
                Ok(())
            }
            Step::Fill { target, value } => nav.fill(target, value),
            Step::Click { target } => {
                nav.click(target).await?;
                Ok(())
            }
            Step::Expect {
                target,
                text,
                text_contains,
                count,
                visible,
                url,
                within_ms,
            } => {
                let mut policy = self.config.retry_policy();
                if let Some(ceiling) = within_ms {
                    policy = policy.with_ceiling(Duration::from_millis(*ceiling));
                }

                let mut checks: Vec<(Option<&_>, Matcher)> = Vec::new();
                if let Some(expected) = text {
                    checks.push((target.as_ref(), Matcher::TextEquals(expected.clone())));
                }
                if let Some(expected) = text_contains {
                    checks.push((target.as_ref(), Matcher::TextContains(expected.clone())));
                }
                if let Some(expected) = count {
                    checks.push((target.as_ref(), Matcher::CountEquals(*expected)));
                }
                match visible {
                    Some(true) => checks.push((target.as_ref(), Matcher::Visible)),
                    Some(false) => checks.push((target.as_ref(), Matcher::NotVisible)),
                    None => {}
                }
                if let Some(expected) = url {
                    checks.push((None, Matcher::UrlEquals(expected.clone())));
                }

                for (check_target, matcher) in checks {
                    check::expect(nav, check_target, &matcher, &policy).await?;
                }
                Ok(())
            }
        }
    }

    /// Best-effort teardown: run declared steps, then drop session state.
    /// Errors are logged and never mask the scenario's own outcome.
    async fn teardown(&self, nav: &mut Navigator, scenario: &Scenario) {
        for (index, step) in scenario.teardown.iter().enumerate() {
            if let Err(e) = self.step(nav, step).await {
                warn!(
                    scenario = %scenario.name,
                    step = index,
                    error = %e,
                    "teardown step failed"
                );
            }
        }
        if let Err(e) = nav.session_mut().reset() {
            warn!(scenario = %scenario.name, error = %e, "session reset failed");
        }
    }
}

fn transition(scenario: &str, phase: &mut Phase, next: Phase) {
    debug!(scenario = %scenario, from = %phase, to = %next, "phase");
    *phase = next;
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
