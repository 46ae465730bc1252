use tokio::io::{AsyncWriteExt, BufWriter};

use crate::domain::{Share, Summary};
use crate::rate::RunCompletion;

fn share_json(share: Share) -> serde_json::Value {
    serde_json::json!({
        "count": share.count,
        "percent_x100": share.percent_x100
    })
}

fn micros(value: std::time::Duration) -> u64 {
    u64::try_from(value.as_micros()).unwrap_or(u64::MAX)
}

pub(crate) fn summary_json(summary: &Summary, completion: &RunCompletion) -> serde_json::Value {
    let latency = &summary.latency;
    let percentiles: serde_json::Map<String, serde_json::Value> = summary
        .percentiles
        .rows()
        .into_iter()
        .map(|(level, value)| (format!("p{}", level), micros(value).into()))
        .collect();
    let status_codes: serde_json::Map<String, serde_json::Value> = summary
        .status_codes
        .iter()
        .map(|(code, share)| (code.to_string(), share_json(*share)))
        .collect();
    let errors: serde_json::Map<String, serde_json::Value> = summary
        .errors
        .iter()
        .map(|(kind, share)| (kind.as_str().to_owned(), share_json(*share)))
        .collect();
    let buckets: serde_json::Map<String, serde_json::Value> = summary
        .buckets
        .rows()
        .into_iter()
        .map(|(bucket, share)| (bucket.label().to_owned(), share_json(share)))
        .collect();

    serde_json::json!({
        "cancelled": completion.cancelled,
        "dispatched": completion.dispatched,
        "total_attempted": summary.total_attempted,
        "successful": summary.successful,
        "failed": summary.failed,
        "success_rate_x100": summary.success_rate_x100,
        "duration_us": micros(summary.duration),
        "target_rps": summary.target_rps,
        "actual_rps_x100": summary.actual_rps_x100,
        "throughput_efficiency_x100": summary.throughput_efficiency_x100,
        "latency_us": {
            "count": latency.count,
            "mean": micros(latency.mean),
            "median": micros(latency.median),
            "min": micros(latency.min),
            "max": micros(latency.max),
            "std_dev": micros(latency.std_dev)
        },
        "percentiles_us": percentiles,
        "status_codes": status_codes,
        "errors": errors,
        "performance": buckets
    })
}

/// Writes the summary as pretty-printed JSON.
pub(crate) async fn export_json(
    path: &str,
    summary: &Summary,
    completion: &RunCompletion,
) -> Result<(), std::io::Error> {
    let payload = summary_json(summary, completion);
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    let json = serde_json::to_vec_pretty(&payload).map_err(std::io::Error::other)?;
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
