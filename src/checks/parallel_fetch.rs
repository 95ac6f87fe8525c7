use super::OVERVIEW_PATH;
use crate::adapters::http::FetchResult;
use crate::core::context::ProbeContext;
use crate::core::shapes::type_name;
use crate::core::{Check, Verdict};
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use async_trait::async_trait;
use std::time::{Duration, Instant};

pub const DASHBOARD_ENDPOINTS: [&str; 9] = [
    OVERVIEW_PATH,
    "/v1/analytics/attendance",
    "/v1/analytics/payroll",
    "/v1/reports/company-overview",
    "/v1/reports/department-performance",
    "/v1/reports/payroll-summary",
    "/v1/reports/leave-utilization",
    "/v1/reports/attendance-analytics",
    "/v1/reports/employee-growth",
];

/// 平行抓取必須明顯快於依序抓取，且資料一致
pub struct ParallelFetch;

#[async_trait]
impl Check for ParallelFetch {
    fn id(&self) -> &'static str {
        "parallel-fetch"
    }

    fn title(&self) -> &'static str {
        "Parallel dashboard fetch is faster and consistent"
    }

    async fn run(&self, ctx: &ProbeContext) -> Result<Verdict> {
        let paths: Vec<String> = DASHBOARD_ENDPOINTS.iter().map(|p| p.to_string()).collect();

        let started = Instant::now();
        let sequential = ctx.api.fetch_sequential(&paths).await;
        let sequential_elapsed = started.elapsed();
        ensure_all_loaded(&sequential, "Sequential")?;

        let started = Instant::now();
        let parallel = ctx.api.fetch_parallel(&paths, paths.len()).await;
        let parallel_elapsed = started.elapsed();
        ensure_all_loaded(&parallel, "Parallel")?;

        tracing::info!(
            "📊 Sequential {:?}, parallel {:?} across {} endpoints",
            sequential_elapsed,
            parallel_elapsed,
            paths.len()
        );

        check_speedup(sequential_elapsed, parallel_elapsed, ctx.settings.thresholds.parallel_speedup_ratio)?;

        check_consistency(&sequential, &parallel)?;
        Ok(Verdict::Passed)
    }
}

fn ensure_all_loaded(results: &[FetchResult], mode: &str) -> Result<()> {
    for result in results {
        match &result.payload {
            Ok(value) if value.is_object() || value.is_array() => {}
            Ok(value) => {
                return Err(ProbeError::assertion(format!(
                    "Unexpected response type for {}: {}",
                    result.path,
                    type_name(value)
                )))
            }
            Err(e) => {
                return Err(ProbeError::assertion(format!(
                    "{} fetch failed for {}: {}",
                    mode, result.path, e
                )))
            }
        }
    }
    Ok(())
}

pub fn check_speedup(sequential: Duration, parallel: Duration, ratio: f64) -> Result<()> {
    verify!(
        parallel.as_secs_f64() < sequential.as_secs_f64() * ratio,
        "Parallel fetching ({:.2}s) not sufficiently faster than sequential ({:.2}s)",
        parallel.as_secs_f64(),
        sequential.as_secs_f64()
    );
    Ok(())
}

/// 同一端點在兩種抓取方式下的資料必須相同
pub fn check_consistency(sequential: &[FetchResult], parallel: &[FetchResult]) -> Result<()> {
    verify!(
        sequential.len() == parallel.len(),
        "Sequential fetch returned {} results but parallel returned {}",
        sequential.len(),
        parallel.len()
    );
    for (seq, par) in sequential.iter().zip(parallel) {
        verify!(
            seq.path == par.path && seq.payload == par.payload,
            "Mismatch between sequential and parallel data for {}, possible caching issue",
            seq.path
        );
    }
    Ok(())
}
