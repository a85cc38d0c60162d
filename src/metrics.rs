//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Counter, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("studiopay_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "studiopay_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Workflow Metrics
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("studiopay_submissions_total", "Total number of submissions received"),
        &["kind"]
    ).expect("metric can be created");
    pub static ref REVIEWS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("studiopay_reviews_total", "Total number of admin review decisions"),
        &["kind", "decision"]
    ).expect("metric can be created");
    pub static ref WITHDRAWALS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("studiopay_withdrawals_total", "Total number of withdrawal transitions"),
        &["transition"]
    ).expect("metric can be created");

    // Ledger Metrics
    pub static ref LEDGER_CREDITS: Counter = Counter::new(
        "studiopay_ledger_credits_total",
        "Total currency amount credited through view accrual"
    ).expect("metric can be created");
    pub static ref LEDGER_DEBITS: Counter = Counter::new(
        "studiopay_ledger_debits_total",
        "Total currency amount reserved for withdrawal requests"
    ).expect("metric can be created");
    pub static ref PROFILES_TOTAL: IntGauge = IntGauge::new(
        "studiopay_profiles_total",
        "Total number of registered profiles"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("studiopay_errors_total", "Total number of errors"),
        &["error_type", "endpoint"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("HTTP_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(SUBMISSIONS_TOTAL.clone()))
        .expect("SUBMISSIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(REVIEWS_TOTAL.clone()))
        .expect("REVIEWS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(WITHDRAWALS_TOTAL.clone()))
        .expect("WITHDRAWALS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(LEDGER_CREDITS.clone()))
        .expect("LEDGER_CREDITS can be registered");
    REGISTRY
        .register(Box::new(LEDGER_DEBITS.clone()))
        .expect("LEDGER_DEBITS can be registered");
    REGISTRY
        .register(Box::new(PROFILES_TOTAL.clone()))
        .expect("PROFILES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
