// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - How often we asked, how often we got told no
// ═══════════════════════════════════════════════════════════════
//
// Atomic counters, bumped by the handlers and read by `GET /metrics`.
// Nothing here ever feeds back into an endpoint's response body.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use serde::Serialize;

/// The metrics snapshot - what gets serialized to JSON
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub analyze_requests: u64,
    pub evidence_requests: u64,
    pub court_attempt_requests: u64,
    pub invalid_cnpj_rejections: u64,
    pub registry_lookups: u64,
    pub registry_failures: u64,
    pub indexer_sources_ok: u64,
    pub indexer_sources_blocked: u64,
    pub court_probes: u64,
    pub court_probes_blocked: u64,
    pub uptime_seconds: u64,
    pub status: String,
}

/// Which endpoint a request arrived on.
#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Analyze,
    Evidence,
    CourtAttempt,
}

pub struct MetricsCollector {
    analyze_requests: AtomicU64,
    evidence_requests: AtomicU64,
    court_attempt_requests: AtomicU64,
    invalid_cnpj_rejections: AtomicU64,
    registry_lookups: AtomicU64,
    registry_failures: AtomicU64,
    indexer_sources_ok: AtomicU64,
    indexer_sources_blocked: AtomicU64,
    court_probes: AtomicU64,
    court_probes_blocked: AtomicU64,
    start_time: Instant,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            analyze_requests: AtomicU64::new(0),
            evidence_requests: AtomicU64::new(0),
            court_attempt_requests: AtomicU64::new(0),
            invalid_cnpj_rejections: AtomicU64::new(0),
            registry_lookups: AtomicU64::new(0),
            registry_failures: AtomicU64::new(0),
            indexer_sources_ok: AtomicU64::new(0),
            indexer_sources_blocked: AtomicU64::new(0),
            court_probes: AtomicU64::new(0),
            court_probes_blocked: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn increment_requests(&self, endpoint: Endpoint) {
        let counter = match endpoint {
            Endpoint::Analyze => &self.analyze_requests,
            Endpoint::Evidence => &self.evidence_requests,
            Endpoint::CourtAttempt => &self.court_attempt_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_invalid_cnpj(&self) {
        self.invalid_cnpj_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registry_lookup(&self, ok: bool) {
        self.registry_lookups.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.registry_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_indexer_sources(&self, ok: usize, blocked: usize) {
        self.indexer_sources_ok.fetch_add(ok as u64, Ordering::Relaxed);
        self.indexer_sources_blocked.fetch_add(blocked as u64, Ordering::Relaxed);
    }

    /// Count a court probe that was actually sent.
    pub fn record_court_probe(&self, ok: bool) {
        self.court_probes.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.court_probes_blocked.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Take a snapshot of all metrics (lock-free reads)
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            analyze_requests: self.analyze_requests.load(Ordering::Relaxed),
            evidence_requests: self.evidence_requests.load(Ordering::Relaxed),
            court_attempt_requests: self.court_attempt_requests.load(Ordering::Relaxed),
            invalid_cnpj_rejections: self.invalid_cnpj_rejections.load(Ordering::Relaxed),
            registry_lookups: self.registry_lookups.load(Ordering::Relaxed),
            registry_failures: self.registry_failures.load(Ordering::Relaxed),
            indexer_sources_ok: self.indexer_sources_ok.load(Ordering::Relaxed),
            indexer_sources_blocked: self.indexer_sources_blocked.load(Ordering::Relaxed),
            court_probes: self.court_probes.load(Ordering::Relaxed),
            court_probes_blocked: self.court_probes_blocked.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            status: "operational".to_string(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
