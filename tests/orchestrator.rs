// tests/orchestrator.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use fleetrun::engine::{NoOpRecord, Orchestrator, Phase, RunOutcome, RunRequest, render_outcome};
use fleetrun::errors::{FleetError, ResourceKind};
use fleetrun::poll::UnfinishedReason;
use fleetrun::types::{DispatchGranularity, TaskStatus};
use fleetrun_test_utils::builders::{array, instance, script, SettingsBuilder};
use fleetrun_test_utils::{init_tracing, ApiCall, FakeApi};

type TestResult = Result<(), Box<dyn Error>>;

fn instance_location(id: &str) -> String {
    FakeApi::task_location(&format!("/api/clouds/1/instances/{id}"))
}

/// Two arrays matching "web-prod" with five instances; `i3` rejects the
/// run request with HTTP 500 and `i5` never finishes.
fn web_prod_fleet() -> FakeApi {
    FakeApi::new()
        .with_array(
            array("web-prod-a", 1),
            vec![instance("web-1", "i1"), instance("web-2", "i2")],
        )
        .with_array(
            array("web-prod-b", 2),
            vec![
                instance("web-3", "i3"),
                instance("web-4", "i4"),
                instance("web-5", "i5"),
            ],
        )
        .with_array(array("db-prod", 3), vec![instance("db-1", "d1")])
        .with_script(script("deploy-app", 5, 41))
        .with_script(script("deploy-app", 7, 42))
        .with_failing_run("/api/clouds/1/instances/i3")
        .with_statuses(&instance_location("i1"), &["pending", "completed: deployed"])
        .with_statuses(&instance_location("i2"), &["completed: Connect instance to ELB"])
        .with_statuses(
            &instance_location("i4"),
            &["pending", "pending", "completed: deployed"],
        )
        .with_statuses(&instance_location("i5"), &["pending"])
}

fn request(executable: &str, noop: bool, wait: Duration) -> RunRequest {
    RunRequest {
        array: "web-prod".to_string(),
        executable: executable.to_string(),
        noop,
        wait,
    }
}

#[tokio::test(start_paused = true)]
async fn partial_dispatch_and_poll_timeout_still_succeed() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let settings = SettingsBuilder::new()
        .poll_concurrency(2)
        .poll_interval(Duration::from_millis(500))
        .build();
    let orchestrator = Orchestrator::new(Arc::clone(&api), &settings);
    let budget = Duration::from_secs(10);

    let started = Instant::now();
    let outcome = orchestrator
        .run(&request("deploy-app", false, budget), &CancellationToken::new())
        .await?;
    assert!(started.elapsed() <= budget + Duration::from_secs(1));

    // Every run request carried the revision-7 script.
    let runs = api.run_calls();
    assert_eq!(runs.len(), 5);
    assert!(runs.iter().all(|c| matches!(
        c,
        ApiCall::Run { value, .. } if value == "/api/right_scripts/42"
    )));

    let RunOutcome::Dispatched { dispatch, poll, .. } = outcome else {
        panic!("expected a dispatched outcome");
    };
    assert_eq!(dispatch.tasks.len(), 4);
    assert_eq!(dispatch.failures.len(), 1);
    assert_eq!(dispatch.failures[0].target.name(), "web-3");

    let report = poll.expect("poll ran");
    assert_eq!(report.finished.len(), 3);
    assert!(report.finished.contains_key(&instance_location("i1")));
    assert!(report.finished.contains_key(&instance_location("i2")));
    assert!(report.finished.contains_key(&instance_location("i4")));
    assert!(!report.finished.contains_key(&instance_location("i5")));

    assert_eq!(report.unfinished.len(), 1);
    assert_eq!(report.unfinished[0].location, instance_location("i5"));
    assert_eq!(report.unfinished[0].reason, UnfinishedReason::TimedOut);

    // Returned tasks carry the statuses seen while polling.
    let status_of = |id: &str| {
        dispatch
            .tasks
            .iter()
            .find(|t| t.location() == instance_location(id))
            .map(|t| (t.status(), t.last_summary().map(str::to_string)))
    };
    assert_eq!(
        status_of("i1"),
        Some((TaskStatus::Completed, Some("completed: deployed".to_string())))
    );
    assert_eq!(
        status_of("i5"),
        Some((TaskStatus::Pending, Some("pending".to_string())))
    );
    Ok(())
}

#[tokio::test]
async fn noop_reports_each_instance_without_dispatching() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let orchestrator = Orchestrator::new(Arc::clone(&api), &SettingsBuilder::new().build());

    let outcome = orchestrator
        .run(
            &request("deploy-app", true, Duration::from_secs(300)),
            &CancellationToken::new(),
        )
        .await?;

    assert!(api.run_calls().is_empty());
    assert!(
        !api.calls()
            .iter()
            .any(|c| matches!(c, ApiCall::Status(_)))
    );

    let RunOutcome::NoOp(records) = outcome else {
        panic!("expected a noop outcome");
    };
    assert_eq!(records.len(), 5);
    assert_eq!(
        records[0],
        NoOpRecord {
            executable: "deploy-app".to_string(),
            array: "web-prod-a".to_string(),
            instance: Some("web-1".to_string()),
        }
    );
    assert_eq!(
        records[0].to_string(),
        "NOOP: Would have run deploy-app on web-1 (array web-prod-a)."
    );
    Ok(())
}

#[tokio::test]
async fn noop_at_array_granularity_reports_arrays() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let settings = SettingsBuilder::new()
        .granularity(DispatchGranularity::Array)
        .build();
    let orchestrator = Orchestrator::new(Arc::clone(&api), &settings);

    let outcome = orchestrator
        .run(
            &request("cookbook::recipe", true, Duration::from_secs(300)),
            &CancellationToken::new(),
        )
        .await?;

    let lines = render_outcome(&outcome);
    assert_eq!(
        lines,
        vec![
            "NOOP: Would have run cookbook::recipe on web-prod-a.".to_string(),
            "NOOP: Would have run cookbook::recipe on web-prod-b.".to_string(),
        ]
    );
    assert!(api.run_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn zero_wait_skips_polling() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let orchestrator = Orchestrator::new(Arc::clone(&api), &SettingsBuilder::new().build());

    let outcome = orchestrator
        .run(&request("deploy-app", false, Duration::ZERO), &CancellationToken::new())
        .await?;

    assert!(outcome.poll_result().is_none());
    assert!(
        !api.calls()
            .iter()
            .any(|c| matches!(c, ApiCall::Status(_)))
    );
    match outcome {
        RunOutcome::Dispatched { dispatch, poll, .. } => {
            assert_eq!(dispatch.tasks.len(), 4);
            assert!(dispatch.tasks.iter().all(|t| t.status() == TaskStatus::Pending));
            assert!(poll.is_none());
        }
        other => panic!("expected a dispatched outcome, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn unresolved_script_aborts_before_dispatch() {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let orchestrator = Orchestrator::new(Arc::clone(&api), &SettingsBuilder::new().build());

    let result = orchestrator
        .run(
            &request("deploy", false, Duration::from_secs(10)),
            &CancellationToken::new(),
        )
        .await;

    match result {
        Err(FleetError::NotFound { kind, name }) => {
            assert_eq!(kind, ResourceKind::Script);
            assert_eq!(name, "deploy");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(api.run_calls().is_empty());
    assert!(
        !api.calls()
            .iter()
            .any(|c| matches!(c, ApiCall::ListInstances(_)))
    );
}

#[tokio::test]
async fn unresolved_array_aborts_before_script_lookup() {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let orchestrator = Orchestrator::new(Arc::clone(&api), &SettingsBuilder::new().build());

    let result = orchestrator
        .run(
            &RunRequest {
                array: "cache-prod".to_string(),
                executable: "deploy-app".to_string(),
                noop: false,
                wait: Duration::from_secs(10),
            },
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        result,
        Err(FleetError::NotFound {
            kind: ResourceKind::Array,
            ..
        })
    ));
    assert_eq!(api.script_searches(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_reports_outstanding_tasks_as_canceled() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet().with_default_summary("pending"));
    let orchestrator = Orchestrator::new(Arc::clone(&api), &SettingsBuilder::new().build());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = orchestrator
        .run(&request("deploy-app", false, Duration::from_secs(300)), &cancel)
        .await?;

    // Dispatch is not interrupted by cancellation.
    assert_eq!(api.run_calls().len(), 5);
    let RunOutcome::Dispatched { poll: Some(report), .. } = outcome else {
        panic!("expected a polled outcome");
    };
    assert!(report.finished.is_empty());
    assert_eq!(report.unfinished.len(), 4);
    assert!(
        report
            .unfinished
            .iter()
            .all(|u| u.reason == UnfinishedReason::Canceled)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn report_lists_finished_and_unfinished_tasks() -> TestResult {
    init_tracing();
    let api = Arc::new(web_prod_fleet());
    let settings = SettingsBuilder::new().dispatch_concurrency(1).build();
    let orchestrator = Orchestrator::new(Arc::clone(&api), &settings);

    let outcome = orchestrator
        .run(
            &request("deploy-app", false, Duration::from_secs(10)),
            &CancellationToken::new(),
        )
        .await?;
    let lines = render_outcome(&outcome);

    assert_eq!(lines[0], "dispatched deploy-app to 4 target(s), 1 failed");
    assert!(lines[1].starts_with("  dispatch failed on instance web-3 (array web-prod-b)"));
    assert!(lines.contains(&format!("  {}: completed: deployed", instance_location("i1"))));
    assert_eq!(
        lines.last().map(String::as_str),
        Some(format!("  {}: timed out (last summary: pending)", instance_location("i5")).as_str())
    );
    Ok(())
}

#[test]
fn phases_follow_the_run_state_machine() {
    assert_eq!(Phase::Resolving.after(true), Phase::NoOpReport);
    assert_eq!(Phase::NoOpReport.after(true), Phase::Done);
    assert_eq!(Phase::Resolving.after(false), Phase::Dispatching);
    assert_eq!(Phase::Dispatching.after(false), Phase::Polling);
    assert_eq!(Phase::Polling.after(false), Phase::Done);
    assert_eq!(Phase::Done.after(false), Phase::Done);
}
