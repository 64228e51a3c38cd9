//! Probe scenarios and the suite runner.
//!
//! Each scenario is a linear sequence of request/assert steps against one
//! live store. Scenarios run strictly sequentially, each inside its own
//! [`PriorityScope`]: a band of priority values no other scenario in this
//! process will touch, cleared on acquire and again on release. A failed
//! step aborts its scenario; the runner records the failure and moves on
//! to the next scenario.

use crate::api::{GroupDefaultsEntry, MessageQuery};
use crate::client::StoreClient;
use crate::error::ProbeError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

// =============================================================================
// PRIORITY SCOPES
// =============================================================================

static NEXT_SCOPE_BASE: AtomicI32 = AtomicI32::new(1_000);

const SCOPE_WIDTH: i32 = 8;

/// A scenario-private band of priority values.
///
/// Bands are handed out from a process-wide counter, so two scopes never
/// overlap. Acquiring a scope clears every priority in the band on the
/// collaborator; the runner clears it again after the scenario body, pass
/// or fail.
#[derive(Debug, Clone, Copy)]
pub struct PriorityScope {
    base: i32,
    width: i32,
}

impl PriorityScope {
    pub async fn acquire(client: &StoreClient) -> Result<PriorityScope, ProbeError> {
        let base = NEXT_SCOPE_BASE.fetch_add(SCOPE_WIDTH, Ordering::Relaxed);
        let scope = PriorityScope {
            base,
            width: SCOPE_WIDTH,
        };
        debug!("acquired priority scope {}..{}", base, base + SCOPE_WIDTH);
        scope.clear(client).await?;
        Ok(scope)
    }

    /// The priority value for the given slot within this scope's band.
    pub fn priority(&self, slot: i32) -> i32 {
        debug_assert!(slot >= 0 && slot < self.width);
        self.base + slot
    }

    pub async fn clear(&self, client: &StoreClient) -> Result<(), ProbeError> {
        for priority in self.base..self.base + self.width {
            client.clear_group(priority).await?;
        }
        Ok(())
    }
}

// =============================================================================
// ASSERTION HELPERS
// =============================================================================

pub fn expect_eq<T: PartialEq + fmt::Debug>(
    check: &str,
    expected: &T,
    actual: &T,
) -> Result<(), ProbeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ProbeError::assertion(
            check,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

pub fn expect_ne<T: PartialEq + fmt::Debug>(
    check: &str,
    left: &T,
    right: &T,
) -> Result<(), ProbeError> {
    if left != right {
        Ok(())
    } else {
        Err(ProbeError::assertion(
            check,
            format!("value distinct from {left:?}"),
            format!("{right:?}"),
        ))
    }
}

pub fn expect_true(check: &str, condition: bool) -> Result<(), ProbeError> {
    if condition {
        Ok(())
    } else {
        Err(ProbeError::assertion(check, "true", "false"))
    }
}

// =============================================================================
// SUITE RUNNER
// =============================================================================

pub struct ScenarioReport {
    pub name: &'static str,
    pub outcome: Result<(), ProbeError>,
    pub duration: Duration,
}

pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| s.outcome.is_err())
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Probe suite started {}", self.started_at.to_rfc3339())?;
        for scenario in &self.scenarios {
            match &scenario.outcome {
                Ok(()) => writeln!(
                    f,
                    "PASS {} ({}ms)",
                    scenario.name,
                    scenario.duration.as_millis()
                )?,
                Err(error) => writeln!(f, "FAIL {}: {}", scenario.name, error)?,
            }
        }
        let failed = self.failures().count();
        write!(
            f,
            "{} scenarios, {} failed",
            self.scenarios.len(),
            failed
        )
    }
}

pub struct ProbeSuite {
    client: StoreClient,
}

impl ProbeSuite {
    pub fn new(client: StoreClient) -> ProbeSuite {
        ProbeSuite { client }
    }

    /// Runs every scenario in fixed order and reports per-scenario
    /// outcomes. Scenario failures do not stop the suite.
    pub async fn run(&self) -> SuiteReport {
        let started_at = Utc::now();
        let mut scenarios = Vec::new();

        scenarios.push(self.run_scenario("insert returns distinct uuids", distinct_uuids).await);
        scenarios.push(
            self.run_scenario("unfiltered get returns inserted uuid", unfiltered_get)
                .await,
        );
        scenarios.push(self.run_scenario("get by uuid is exact and idempotent", get_by_uuid).await);
        scenarios.push(
            self.run_scenario("get by priority selects matching message", get_by_priority)
                .await,
        );
        scenarios.push(
            self.run_scenario("group clear isolates later queries", group_clear)
                .await,
        );
        scenarios.push(
            self.run_scenario("reprioritize moves message between groups", reprioritize)
                .await,
        );
        scenarios.push(
            self.run_scenario("stats counters track inserts and deletes", stats_track)
                .await,
        );
        scenarios.push(
            self.run_scenario("group report and defaults round-trip", group_report_and_defaults)
                .await,
        );

        SuiteReport {
            started_at,
            scenarios,
        }
    }

    async fn run_scenario<F, Fut>(&self, name: &'static str, body: F) -> ScenarioReport
    where
        F: FnOnce(StoreClient, PriorityScope) -> Fut,
        Fut: Future<Output = Result<(), ProbeError>>,
    {
        info!("running scenario '{name}'");
        let start = Instant::now();
        let outcome = match PriorityScope::acquire(&self.client).await {
            Err(error) => Err(error),
            Ok(scope) => {
                let result = body(self.client.clone(), scope).await;
                // release even when the body failed
                let release = scope.clear(&self.client).await;
                result.and(release)
            }
        };
        ScenarioReport {
            name,
            outcome,
            duration: start.elapsed(),
        }
    }
}

// =============================================================================
// SCENARIO BODIES
// =============================================================================

async fn distinct_uuids(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let priority = scope.priority(0);
    let first = client.add_message(priority, "foo").await?;
    let second = client.add_message(priority, "foo").await?;
    expect_true("insert returns a uuid", !first.is_empty())?;
    expect_ne("uuid of repeated identical insert", &first, &second)
}

/// Observes the store's global head, so it only holds on a collaborator
/// that is otherwise idle.
async fn unfiltered_get(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let uuid = client.add_message(scope.priority(0), "foo").await?;
    let found = client.next_message().await?;
    match found {
        Some(message) => expect_eq("uuid of unfiltered get", &uuid, &message.uuid),
        None => Err(ProbeError::assertion(
            "unfiltered get after insert",
            "a message",
            "none",
        )),
    }
}

async fn get_by_uuid(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let uuid1 = client.add_message(scope.priority(0), "foo").await?;
    let _uuid2 = client.add_message(scope.priority(1), "foo").await?;

    for _ in 0..2 {
        let found = client.get_message(&MessageQuery::by_uuid(&uuid1)).await?;
        match found {
            Some(message) => expect_eq("uuid of lookup by uuid", &uuid1, &message.uuid)?,
            None => {
                return Err(ProbeError::assertion(
                    "lookup by uuid",
                    format!("message {uuid1}"),
                    "none",
                ));
            }
        }
    }
    Ok(())
}

async fn get_by_priority(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let uuid1 = client.add_message(scope.priority(0), "foo").await?;
    let _uuid2 = client.add_message(scope.priority(1), "foo").await?;

    let found = client
        .get_message(&MessageQuery::by_priority(scope.priority(0)))
        .await?;
    match found {
        Some(message) => expect_eq("uuid of lookup by priority", &uuid1, &message.uuid),
        None => Err(ProbeError::assertion(
            "lookup by priority",
            format!("message {uuid1}"),
            "none",
        )),
    }
}

async fn group_clear(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let priority = scope.priority(0);
    let uuid = client.add_message(priority, "foo").await?;
    client.clear_group(priority).await?;

    let found = client.get_message(&MessageQuery::by_priority(priority)).await?;
    match found {
        None => Ok(()),
        Some(message) if message.uuid == uuid => Err(ProbeError::assertion(
            "query after group clear",
            "no pre-delete uuid",
            format!("uuid {uuid}"),
        )),
        Some(message) => Err(ProbeError::assertion(
            "query after group clear",
            "no message",
            format!("uuid {}", message.uuid),
        )),
    }
}

async fn reprioritize(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let from = scope.priority(0);
    let to = scope.priority(1);
    let uuid = client.add_message(from, "foo").await?;
    client.reprioritize_message(&uuid, to).await?;

    let moved = client.get_message(&MessageQuery::by_priority(to)).await?;
    match moved {
        Some(message) => expect_eq("uuid under new priority", &uuid, &message.uuid)?,
        None => {
            return Err(ProbeError::assertion(
                "lookup under new priority",
                format!("message {uuid}"),
                "none",
            ));
        }
    }

    let stale = client.get_message(&MessageQuery::by_priority(from)).await?;
    expect_eq("message under old priority", &None, &stale)
}

async fn stats_track(client: StoreClient, scope: PriorityScope) -> Result<(), ProbeError> {
    let before = client.stats().await?;
    let uuid = client.add_message(scope.priority(0), "foo").await?;
    client.delete_message(&uuid).await?;
    let after = client.stats().await?;

    expect_eq("inserted counter delta", &(before.inserted + 1), &after.inserted)?;
    expect_eq("deleted counter delta", &(before.deleted + 1), &after.deleted)
}

async fn group_report_and_defaults(
    client: StoreClient,
    scope: PriorityScope,
) -> Result<(), ProbeError> {
    let priority = scope.priority(0);

    client
        .set_group_defaults(&GroupDefaultsEntry {
            priority,
            max_byte_size: Some(1_048_576),
        })
        .await?;
    let defaults = client.group_defaults(Some(priority)).await?;
    expect_eq("group defaults entry count", &1, &defaults.len())?;
    expect_eq(
        "configured max byte size",
        &Some(1_048_576),
        &defaults[0].max_byte_size,
    )?;

    let uuid1 = client.add_message(priority, "foo").await?;
    let uuid2 = client.add_message(priority, "bar").await?;

    let report = client.group_report(priority, true).await?;
    match report {
        Some(report) => {
            expect_eq("group message count", &2, &report.msg_count)?;
            let uuids: Vec<&str> = report.messages.iter().map(|m| m.uuid.as_str()).collect();
            expect_true(
                "group report lists inserted uuids",
                uuids.contains(&uuid1.as_str()) && uuids.contains(&uuid2.as_str()),
            )?;
        }
        None => {
            return Err(ProbeError::assertion(
                "group report after inserts",
                "a report",
                "none",
            ));
        }
    }

    client.delete_group_defaults(priority).await?;
    let defaults = client.group_defaults(Some(priority)).await?;
    expect_eq("group defaults after delete", &0, &defaults.len())
}
