//! Integration tests for the Driver module

use super::*;
use crate::catalog::{Tier, CATALOG};
use crate::config::TrafficConfig;
use crate::connection::mock::MockConnector;
use crate::connection::{ConnectionManager, ConnectionState, ReconnectPolicy};
use crate::error::LoadgenError;
use crate::probe::{ProbeWorker, PROBE_STATEMENT};

use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy::default()
        .with_bootstrap(5, Duration::ZERO)
        .with_redial(3, Duration::ZERO)
}

fn manager(connector: &MockConnector, role: &'static str) -> ConnectionManager {
    ConnectionManager::new(Arc::new(connector.clone()), role).with_policy(fast_policy())
}

/// 10 queries per second with no jitter
fn steady_traffic() -> TrafficConfig {
    TrafficConfig::default()
        .with_base_rate(10.0)
        .with_rate_jitter(0.0)
}

fn driver(connector: &MockConnector) -> Driver {
    DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(manager(connector, "driver"))
        .defer_delay(Duration::ZERO)
        .seed(7)
        .build()
        .unwrap()
}

// ============================================================================
// Single cycles
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_step_executes_and_records() {
    let connector = MockConnector::new().with_rows(5);
    let mut driver = driver(&connector);
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    let outcome = driver.step(&mut handle).await;

    match outcome {
        CycleOutcome::Executed(result) => {
            assert!(result.success);
            assert_eq!(result.row_count, 5);
        }
        CycleOutcome::Deferred => panic!("expected an execution"),
    }
    assert_eq!(driver.stats().total, 1);
    assert_eq!(driver.stats().succeeded, 1);
    assert_eq!(driver.stats().rows, 5);

    let statements = connector.state().statements();
    assert_eq!(statements.len(), 1);
    assert!(CATALOG.iter().any(|t| t.statement == statements[0].1));
}

#[tokio::test(start_paused = true)]
async fn test_step_paces_by_base_interval() {
    let connector = MockConnector::new();
    let mut driver = driver(&connector);
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    let start = tokio::time::Instant::now();
    driver.step(&mut handle).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(102));
}

#[tokio::test(start_paused = true)]
async fn test_failed_redial_defers_cycle() {
    // Bootstrap dial succeeds, the ping fails, then all three redials fail
    let connector = MockConnector::new()
        .with_dials([true, false, false, false])
        .with_pings([false]);
    let mut driver = driver(&connector);
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    let first = driver.step(&mut handle).await;
    assert_eq!(first, CycleOutcome::Deferred);
    assert_eq!(driver.stats().total, 0);
    assert_eq!(driver.stats().deferred, 1);
    assert_eq!(connector.state().queries(), 0);
    assert_eq!(handle.state(), ConnectionState::Disconnected);

    // The next cycle reconnects and proceeds normally
    let second = driver.step(&mut handle).await;
    assert!(matches!(second, CycleOutcome::Executed(ref r) if r.success));
    assert_eq!(driver.stats().total, 1);
    assert_eq!(driver.stats().deferred, 1);
    assert_eq!(connector.state().dials(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_defer_delay_is_applied() {
    let connector = MockConnector::new()
        .with_dials([true, false, false, false])
        .with_pings([false]);
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(manager(&connector, "driver"))
        .build()
        .unwrap();
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    let start = tokio::time::Instant::now();
    assert_eq!(driver.step(&mut handle).await, CycleOutcome::Deferred);
    let elapsed = start.elapsed();
    assert!(elapsed >= DEFAULT_DEFER_DELAY && elapsed < DEFAULT_DEFER_DELAY + Duration::from_millis(2));
}

#[tokio::test(start_paused = true)]
async fn test_query_failure_does_not_stop_cycles() {
    let connector = MockConnector::new().with_queries([false, false, true]);
    let mut driver = driver(&connector);
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    for _ in 0..3 {
        driver.step(&mut handle).await;
        let stats = driver.stats();
        assert_eq!(stats.total, stats.succeeded + stats.failed);
    }

    assert_eq!(driver.stats().failed, 2);
    assert_eq!(driver.stats().succeeded, 1);

    // Each failure forced a fresh session for the following statement
    let sessions: Vec<usize> = connector
        .state()
        .statements()
        .iter()
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(sessions, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_single_tier_weights_only_issue_that_tier() {
    let connector = MockConnector::new();
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic().with_tier_weights([
            (Tier::Light, 1.0),
            (Tier::Medium, 0.0),
            (Tier::Heavy, 0.0),
        ]))
        .manager(manager(&connector, "driver"))
        .seed(3)
        .build()
        .unwrap();
    let mut handle = driver.connection_manager().bootstrap().await.unwrap();

    for _ in 0..25 {
        driver.step(&mut handle).await;
    }

    for (_, statement) in connector.state().statements() {
        let template = CATALOG
            .iter()
            .find(|t| t.statement == statement)
            .unwrap();
        assert_eq!(template.tier, Tier::Light);
    }
}

// ============================================================================
// Full lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_bootstrap_exhaustion_never_runs() {
    let connector = MockConnector::new().failing_dials(60);
    let probe_connector = MockConnector::new();
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(ConnectionManager::new(Arc::new(connector.clone()), "driver"))
        .probe(ProbeWorker::new(manager(&probe_connector, "probe")))
        .build()
        .unwrap();

    let err = driver.run(std::future::pending()).await.unwrap_err();

    assert!(matches!(err, LoadgenError::FatalBootstrap { attempts: 60, .. }));
    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(connector.state().dials(), 60);
    assert_eq!(connector.state().queries(), 0);
    assert_eq!(probe_connector.state().dials(), 0, "probe must not start");
    assert_eq!(driver.stats().total, 0);
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_during_bootstrap_stops_cleanly() {
    let connector = MockConnector::new().failing_dials(60);
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(ConnectionManager::new(Arc::new(connector.clone()), "driver"))
        .build()
        .unwrap();

    let stats = driver
        .run(tokio::time::sleep(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(stats.total, 0);
    assert!(connector.state().dials() < 60);
}

#[tokio::test(start_paused = true)]
async fn test_run_until_interrupt() {
    let connector = MockConnector::new().with_queries([true, false, true, false]);
    let probe_connector = MockConnector::new();
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(manager(&connector, "driver"))
        .probe(
            ProbeWorker::new(manager(&probe_connector, "probe"))
                .with_interval(Duration::from_secs(3)),
        )
        .summary_every(10)
        .seed(11)
        .build()
        .unwrap();

    let stats = driver
        .run(tokio::time::sleep(Duration::from_secs(10)))
        .await
        .unwrap();

    assert_eq!(driver.state(), DriverState::Stopped);
    assert_eq!(stats.total, stats.succeeded + stats.failed);
    assert_eq!(stats.failed, 2);
    assert!(
        (95..=101).contains(&stats.total),
        "expected about 100 cycles at 10/s, got {}",
        stats.total
    );

    // The driver's final connection is closed gracefully
    assert!(connector.state().closes() >= 1);

    // Probe ran at t = 0, 3, 6, 9 on its own connections
    let probe_state = probe_connector.state();
    assert_eq!(probe_state.dials(), 4);
    assert!(probe_state
        .statements()
        .iter()
        .all(|(_, s)| s == PROBE_STATEMENT));
    assert!(connector
        .state()
        .statements()
        .iter()
        .all(|(_, s)| s != PROBE_STATEMENT));
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_wakes_pacer_sleep() {
    let connector = MockConnector::new();
    let mut driver = DriverBuilder::new()
        .traffic(
            TrafficConfig::default()
                .with_base_rate(0.001)
                .with_rate_jitter(0.0),
        )
        .manager(manager(&connector, "driver"))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    let stats = driver
        .run(tokio::time::sleep(Duration::from_secs(1)))
        .await
        .unwrap();

    assert_eq!(stats.total, 1);
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_stuck_probe_is_aborted_after_drain_timeout() {
    let connector = MockConnector::new();
    let probe_connector = MockConnector::new().with_query_delay(Duration::from_secs(3600));
    let mut driver = DriverBuilder::new()
        .traffic(steady_traffic())
        .manager(manager(&connector, "driver"))
        .probe(ProbeWorker::new(manager(&probe_connector, "probe")).with_statement_timeout(None))
        .drain_timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    let start = tokio::time::Instant::now();
    driver
        .run(tokio::time::sleep(Duration::from_secs(1)))
        .await
        .unwrap();

    assert_eq!(driver.state(), DriverState::Stopped);
    assert!(start.elapsed() < Duration::from_secs(10));
}
