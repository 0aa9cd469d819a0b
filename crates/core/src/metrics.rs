//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scan cycles (results, duration)
//! - Candidates and links (winners, losers, rejections, link outcomes)
//! - Library hygiene (sweeps, stale entries, tracked entries)
//! - External catalogs (lookups by result)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Scan Cycles
// =============================================================================

/// Scan cycles total by result.
pub static SCAN_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelink_scan_cycles_total", "Total scan cycles"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Scan cycle duration in seconds.
pub static SCAN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelink_scan_duration_seconds",
            "Duration of a full scan cycle",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Candidates and Links
// =============================================================================

/// Discovered files by classification result.
pub static CANDIDATES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelink_candidates_total",
            "Discovered files by selection result",
        ),
        &["category", "result"], // "winner", "loser", "rejected"
    )
    .unwrap()
});

/// Link operations by outcome.
pub static LINKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelink_links_total", "Link operations by outcome"),
        &["category", "outcome"], // "unchanged", "created", "replaced", "failed"
    )
    .unwrap()
});

// =============================================================================
// Library Hygiene
// =============================================================================

/// Broken symlinks removed by sweeps.
pub static SWEEP_LINKS_REMOVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelink_sweep_links_removed_total",
        "Broken symlinks removed from the library",
    )
    .unwrap()
});

/// Empty directories pruned by sweeps.
pub static SWEEP_DIRS_PRUNED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelink_sweep_directories_pruned_total",
        "Empty directories pruned from the library",
    )
    .unwrap()
});

/// State entries evicted because their source disappeared.
pub static STALE_EVICTIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reelink_stale_entries_evicted_total",
        "State entries dropped because their source no longer exists",
    )
    .unwrap()
});

/// Entries currently tracked in state, by category.
pub static TRACKED_ENTRIES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "reelink_tracked_entries",
            "Source files currently linked into the library",
        ),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// External Catalogs
// =============================================================================

/// Catalog lookups by catalog and result.
pub static CATALOG_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelink_catalog_lookups_total",
            "External catalog title lookups",
        ),
        &["catalog", "result"], // "found", "not_found", "error"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Scan cycles
        Box::new(SCAN_CYCLES.clone()),
        Box::new(SCAN_DURATION.clone()),
        // Candidates and links
        Box::new(CANDIDATES.clone()),
        Box::new(LINKS.clone()),
        // Library hygiene
        Box::new(SWEEP_LINKS_REMOVED.clone()),
        Box::new(SWEEP_DIRS_PRUNED.clone()),
        Box::new(STALE_EVICTIONS.clone()),
        Box::new(TRACKED_ENTRIES.clone()),
        // External catalogs
        Box::new(CATALOG_LOOKUPS.clone()),
    ]
}
