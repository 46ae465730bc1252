use std::time::Duration;

use crate::domain::{Share, Summary, TestConfig};
use crate::rate::{RunCompletion, TierPlan};

const RULE_WIDTH: usize = 70;
/// Scale of every `*_x100` fixed-point value.
pub(crate) const PERCENT_DIVISOR: u64 = 100;
const US_PER_MS: u128 = 1_000;
const US_PER_HUNDREDTH_MS: u128 = 10;
const MS_PER_HUNDREDTH_SEC: u128 = 10;
const SECS_PER_MIN: u64 = 60;

/// Banner printed before the first request goes out.
pub(crate) fn render_run_header(config: &TestConfig, plan: &TierPlan) -> String {
    let mut out = Vec::new();
    push_line(&mut out, "Starting load test...");
    push_line(&mut out, &format!("   URL: {}", config.url));
    push_line(&mut out, &format!("   Method: {}", config.method.as_str()));
    push_line(
        &mut out,
        &format!("   Target RPS: {}", group_thousands(config.target_rps.get())),
    );
    push_line(
        &mut out,
        &format!(
            "   Total requests: {}",
            group_thousands(config.total_requests.get())
        ),
    );
    push_line(
        &mut out,
        &format!(
            "   Random User-Agent: {}",
            if config.rotate_user_agent { "Yes" } else { "No" }
        ),
    );
    push_line(
        &mut out,
        &format!(
            "   Strategy: {} (batch {}, concurrency {})",
            plan.tier.as_str(),
            group_thousands(plan.batch_size),
            plan.concurrency_bound
        ),
    );
    push_line(&mut out, &"-".repeat(RULE_WIDTH));
    out.join("\n")
}

pub(crate) fn render_completion(completion: &RunCompletion) -> String {
    if completion.cancelled {
        format!(
            "Load test interrupted after {} requests ({} seconds).",
            group_thousands(completion.dispatched),
            format_secs(completion.duration)
        )
    } else {
        format!(
            "Load test completed in {} seconds.",
            format_secs(completion.duration)
        )
    }
}

/// Renders the end-of-run report. Sections without data are left out.
pub fn render_summary(summary: &Summary, cancelled: bool) -> String {
    let mut out = Vec::new();
    let rule = "=".repeat(RULE_WIDTH);
    push_line(&mut out, &rule);
    push_line(&mut out, "LOAD TEST SUMMARY");
    push_line(&mut out, &rule);

    if cancelled {
        push_line(
            &mut out,
            &format!(
                "Run cancelled: partial results over {} attempted requests.",
                group_thousands(summary.total_attempted)
            ),
        );
    }

    if summary.total_attempted == 0 {
        push_line(&mut out, "No results to display.");
        push_line(&mut out, &rule);
        return out.join("\n");
    }

    push_basic(&mut out, summary);
    if summary.latency.count > 0 {
        push_latency(&mut out, summary);
        push_percentiles(&mut out, summary);
    }
    if !summary.duration.is_zero() {
        push_throughput(&mut out, summary);
    }
    if !summary.status_codes.is_empty() {
        push_section(&mut out, "STATUS CODE DISTRIBUTION");
        for (code, share) in &summary.status_codes {
            push_share(&mut out, &code.to_string(), *share, " requests");
        }
    }
    if !summary.errors.is_empty() {
        push_section(&mut out, "ERROR DISTRIBUTION");
        for (kind, share) in &summary.errors {
            push_share(&mut out, kind.as_str(), *share, " requests");
        }
    }
    if summary.successful > 0 {
        push_section(&mut out, "PERFORMANCE ANALYSIS");
        for (bucket, share) in summary.buckets.rows() {
            push_share(&mut out, bucket.label(), share, "");
        }
    }

    push_line(&mut out, &rule);
    out.join("\n")
}

fn push_basic(out: &mut Vec<String>, summary: &Summary) {
    push_line(out, "BASIC STATISTICS");
    push_line(
        out,
        &format!("   Total Requests: {}", group_thousands(summary.total_attempted)),
    );
    push_line(
        out,
        &format!("   Successful: {}", group_thousands(summary.successful)),
    );
    push_line(out, &format!("   Failed: {}", group_thousands(summary.failed)));
    push_line(
        out,
        &format!("   Success Rate: {}%", format_x100(summary.success_rate_x100)),
    );
    push_line(
        out,
        &format!("   Test Duration: {} seconds", format_secs(summary.duration)),
    );
    push_line(
        out,
        &format!("   Target RPS: {}", group_thousands(summary.target_rps)),
    );
    push_line(
        out,
        &format!("   Actual RPS: {}", format_x100(summary.actual_rps_x100)),
    );
}

fn push_latency(out: &mut Vec<String>, summary: &Summary) {
    let latency = &summary.latency;
    push_section(out, "RESPONSE TIME STATISTICS (Successful Requests)");
    push_line(out, &format!("   Count: {}", group_thousands(latency.count)));
    push_line(out, &format!("   Average: {}", format_ms(latency.mean)));
    push_line(out, &format!("   Median: {}", format_ms(latency.median)));
    push_line(out, &format!("   Min: {}", format_ms(latency.min)));
    push_line(out, &format!("   Max: {}", format_ms(latency.max)));
    push_line(out, &format!("   Std Dev: {}", format_ms(latency.std_dev)));
}

fn push_percentiles(out: &mut Vec<String>, summary: &Summary) {
    push_section(out, "PERCENTILES");
    for (level, value) in summary.percentiles.rows() {
        push_line(out, &format!("   P{}: {}", level, format_ms(value)));
    }
}

fn push_throughput(out: &mut Vec<String>, summary: &Summary) {
    push_section(out, "THROUGHPUT ANALYSIS");
    push_line(
        out,
        &format!(
            "   Requests/Second: {}",
            format_x100(summary.actual_rps_x100)
        ),
    );
    push_line(
        out,
        &format!(
            "   Requests/Minute: {}",
            format_x100(summary.actual_rps_x100.saturating_mul(SECS_PER_MIN))
        ),
    );
    push_line(
        out,
        &format!(
            "   Throughput Efficiency: {}%",
            format_x100(summary.throughput_efficiency_x100)
        ),
    );
}

fn push_share(out: &mut Vec<String>, label: &str, share: Share, unit: &str) {
    push_line(
        out,
        &format!(
            "   {}: {}{} ({}%)",
            label,
            group_thousands(share.count),
            unit,
            format_x100(share.percent_x100)
        ),
    );
}

fn push_section(out: &mut Vec<String>, title: &str) {
    out.push(String::new());
    push_line(out, title);
}

fn push_line(out: &mut Vec<String>, line: &str) {
    out.push(line.to_owned());
}

pub(crate) fn format_x100(value: u64) -> String {
    format!(
        "{}.{:02}",
        group_thousands(value / PERCENT_DIVISOR),
        value % PERCENT_DIVISOR
    )
}

/// Milliseconds with two decimals.
pub(crate) fn format_ms(value: Duration) -> String {
    let micros = value.as_micros();
    let whole = micros.checked_div(US_PER_MS).unwrap_or(0);
    let frac = micros
        .checked_rem(US_PER_MS)
        .unwrap_or(0)
        .checked_div(US_PER_HUNDREDTH_MS)
        .unwrap_or(0);
    format!("{}.{:02}ms", whole, frac)
}

fn format_secs(value: Duration) -> String {
    let hundredths = value.as_millis().checked_div(MS_PER_HUNDREDTH_SEC).unwrap_or(0);
    let whole = hundredths.checked_div(100).unwrap_or(0);
    let frac = hundredths.checked_rem(100).unwrap_or(0);
    format!("{}.{:02}", whole, frac)
}

pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len().saturating_add(digits.len() / 3));
    let lead = digits.len() % 3;
    for (index, ch) in digits.chars().enumerate() {
        if index != 0 && index % 3 == lead {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
