//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Media jobs (outcome and duration per operation)
//! - Clip extraction
//! - Invocations of the external media tool

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Media Jobs
// =============================================================================

/// Media jobs total by operation and outcome.
pub static MEDIA_JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediacut_media_jobs_total", "Total media jobs processed"),
        &["operation", "outcome"], // operation: "convert", "clip"; outcome: "success" or error kind
    )
    .unwrap()
});

/// Media job duration in seconds, upload persisted to response ready.
pub static MEDIA_JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediacut_media_job_duration_seconds",
            "Duration of media jobs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Clips
// =============================================================================

/// Clips extracted and packaged.
pub static CLIPS_EXTRACTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mediacut_clips_extracted_total",
        "Total clips extracted into archives",
    )
    .unwrap()
});

/// Clips per request.
pub static CLIPS_PER_REQUEST: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("mediacut_clips_per_request", "Number of clips requested")
            .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 50.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// External Tool
// =============================================================================

/// Tool invocations by task and result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediacut_tool_invocations_total",
            "Total invocations of the media tool",
        ),
        &["task", "result"], // task: "probe", "audio", "clip"; result: "success", "failed", "timeout"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(MEDIA_JOBS_TOTAL.clone()),
        Box::new(MEDIA_JOB_DURATION.clone()),
        // Clips
        Box::new(CLIPS_EXTRACTED.clone()),
        Box::new(CLIPS_PER_REQUEST.clone()),
        // Tool
        Box::new(TOOL_INVOCATIONS.clone()),
    ]
}
