use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::tempdir;

use super::export::summary_json;
use super::runner::execute_run;
use super::summary::{format_ms, format_x100, group_thousands};
use super::{RunOptions, export_json, render_run_header, render_summary};
use crate::domain::{
    BucketCounts, ErrorKind, HttpMethod, LatencyStats, Percentiles, PositiveU64, RequestOutcome,
    Share, Summary, TestConfig,
};
use crate::error::{AppError, AppResult};
use crate::http::Dispatch;
use crate::rate::{RunCompletion, TierPlan};
use crate::shutdown_handlers::shutdown_channel;

struct FixedLatency {
    status_code: u16,
    latency: Duration,
}

#[async_trait]
impl Dispatch for FixedLatency {
    async fn dispatch(&self, _request_id: u64) -> RequestOutcome {
        tokio::time::sleep(self.latency).await;
        RequestOutcome::success(self.status_code, self.latency)
    }
}

fn run_paused_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn positive(value: u64) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(AppError::validation)
}

fn test_config(rps: u64, total: u64) -> AppResult<TestConfig> {
    let url = url::Url::parse("http://127.0.0.1:9/health")
        .map_err(|err| AppError::validation(format!("bad url: {}", err)))?;
    Ok(TestConfig::new(url, HttpMethod::Get, positive(rps)?, positive(total)?))
}

fn timeout_only_summary() -> Summary {
    let mut errors = BTreeMap::new();
    errors.insert(
        ErrorKind::Timeout,
        Share {
            count: 10,
            percent_x100: 10_000,
        },
    );
    Summary {
        total_attempted: 10,
        successful: 0,
        failed: 10,
        success_rate_x100: 0,
        duration: Duration::from_secs(30),
        target_rps: 10,
        actual_rps_x100: 33,
        throughput_efficiency_x100: 333,
        latency: LatencyStats::default(),
        percentiles: Percentiles::default(),
        status_codes: BTreeMap::new(),
        errors,
        buckets: BucketCounts::default(),
    }
}

#[test]
fn uniform_fast_run_produces_full_success_summary() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(100, 1000)?;
        let dispatcher = Arc::new(FixedLatency {
            status_code: 200,
            latency: Duration::from_millis(50),
        });
        let (shutdown_tx, _) = shutdown_channel();

        let report = execute_run(&config, dispatcher, &shutdown_tx, RunOptions::default()).await?;
        let summary = &report.summary;

        if report.completion.cancelled || report.completion.dispatched != 1000 {
            return Err(AppError::validation(format!(
                "Unexpected completion: {:?}",
                report.completion
            )));
        }
        if summary.total_attempted != 1000 || summary.successful != 1000 {
            return Err(AppError::validation("Expected 1000 successes"));
        }
        if summary.success_rate_x100 != 10_000 {
            return Err(AppError::validation("Expected 100% success"));
        }
        let fifty = Duration::from_millis(50);
        if summary.percentiles.p50 != fifty || summary.percentiles.p99 != fifty {
            return Err(AppError::validation(format!(
                "Unexpected percentiles: {:?}",
                summary.percentiles
            )));
        }
        if summary.buckets.fast.count != 1000 || summary.buckets.fast.percent_x100 != 10_000 {
            return Err(AppError::validation("Expected every request to be fast"));
        }
        if summary.status_codes.get(&200).map(|share| share.count) != Some(1000) {
            return Err(AppError::validation("Expected 1000 x 200"));
        }
        // Ten batches one second apart plus the last batch's latency.
        if report.completion.duration < Duration::from_secs(9) {
            return Err(AppError::validation(format!(
                "Run finished too early: {:?}",
                report.completion.duration
            )));
        }
        Ok(())
    })
}

#[test]
fn shutdown_before_start_yields_empty_report() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(5, 50)?;
        let dispatcher = Arc::new(FixedLatency {
            status_code: 204,
            latency: Duration::from_millis(10),
        });
        let (shutdown_tx, _keep) = shutdown_channel();
        let shutdown = shutdown_tx.clone();
        let sender = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(shutdown.send(()));
        });

        let report = execute_run(&config, dispatcher, &shutdown_tx, RunOptions::default()).await?;
        sender
            .await
            .map_err(|err| AppError::validation(format!("sender failed: {}", err)))?;

        if !report.completion.cancelled {
            return Err(AppError::validation("Expected a cancelled run"));
        }
        // Paced at 5 rps: requests at 0ms, 200ms, 400ms before the signal.
        if report.summary.total_attempted != 3 {
            return Err(AppError::validation(format!(
                "Expected 3 attempted, got {}",
                report.summary.total_attempted
            )));
        }
        let text = render_summary(&report.summary, report.completion.cancelled);
        if !text.contains("Run cancelled") || !text.contains("204: 3 requests (100.00%)") {
            return Err(AppError::validation(format!("Unexpected report:\n{}", text)));
        }
        Ok(())
    })
}

#[test]
fn timeout_only_summary_renders_error_distribution() -> AppResult<()> {
    let text = render_summary(&timeout_only_summary(), false);
    for expected in [
        "Success Rate: 0.00%",
        "Timeout: 10 requests (100.00%)",
        "Test Duration: 30.00 seconds",
        "Requests/Minute: 19.80",
    ] {
        if !text.contains(expected) {
            return Err(AppError::validation(format!(
                "Missing '{}' in:\n{}",
                expected, text
            )));
        }
    }
    for absent in ["PERCENTILES", "PERFORMANCE ANALYSIS", "STATUS CODE"] {
        if text.contains(absent) {
            return Err(AppError::validation(format!(
                "Unexpected section '{}' in:\n{}",
                absent, text
            )));
        }
    }
    Ok(())
}

#[test]
fn empty_summary_renders_placeholder() -> AppResult<()> {
    let mut summary = timeout_only_summary();
    summary.total_attempted = 0;
    summary.failed = 0;
    summary.errors.clear();
    let text = render_summary(&summary, true);
    if !text.contains("No results to display.") || text.contains("BASIC STATISTICS") {
        return Err(AppError::validation(format!("Unexpected report:\n{}", text)));
    }
    Ok(())
}

#[test]
fn run_header_names_strategy() -> AppResult<()> {
    let config = test_config(1500, 3000)?.with_user_agent_rotation(Vec::new());
    let plan = TierPlan::for_rate(config.target_rps);
    let text = render_run_header(&config, &plan);
    for expected in [
        "Target RPS: 1,500",
        "Total requests: 3,000",
        "Random User-Agent: Yes",
        "Strategy: capped (batch 1,000, concurrency 2000)",
    ] {
        if !text.contains(expected) {
            return Err(AppError::validation(format!(
                "Missing '{}' in:\n{}",
                expected, text
            )));
        }
    }
    Ok(())
}

#[test]
fn number_formatting() -> AppResult<()> {
    let cases = [
        (group_thousands(0), "0"),
        (group_thousands(999), "999"),
        (group_thousands(1_000), "1,000"),
        (group_thousands(1_234_567), "1,234,567"),
        (format_x100(9_950), "99.50"),
        (format_x100(12_345_607), "123,456.07"),
        (format_ms(Duration::from_micros(50_000)), "50.00ms"),
        (format_ms(Duration::from_micros(1_234)), "1.23ms"),
    ];
    for (actual, expected) in cases {
        if actual != expected {
            return Err(AppError::validation(format!(
                "Expected {}, got {}",
                expected, actual
            )));
        }
    }
    Ok(())
}

#[test]
fn export_writes_summary_json() -> AppResult<()> {
    run_paused_test(async {
        let dir = tempdir()?;
        let path = dir.path().join("summary.json");
        let path_str = path
            .to_str()
            .ok_or_else(|| AppError::validation("non-utf8 temp path"))?;
        let summary = timeout_only_summary();
        let completion = RunCompletion {
            dispatched: 10,
            duration: Duration::from_secs(30),
            cancelled: false,
        };

        export_json(path_str, &summary, &completion).await?;
        let written = tokio::fs::read_to_string(&path).await?;
        let parsed: serde_json::Value = serde_json::from_str(&written)?;

        if parsed != summary_json(&summary, &completion) {
            return Err(AppError::validation(format!("Unexpected export: {}", written)));
        }
        if parsed.pointer("/errors/Timeout/count") != Some(&serde_json::json!(10)) {
            return Err(AppError::validation("Expected timeout count in export"));
        }
        if parsed.pointer("/percentiles_us/p99") != Some(&serde_json::json!(0)) {
            return Err(AppError::validation("Expected zeroed percentiles"));
        }
        Ok(())
    })
}
