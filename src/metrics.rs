//! Prometheus counter families fed by the status collector.
//!
//! The collector only knows the `MetricsSink` trait. `PrometheusSink` is the
//! production implementation and registers one labelled counter family per
//! event type.

use prometheus::{IntCounterVec, Opts, Registry};

use crate::error::StatusError;
use crate::event::EventFamily;

/// Receives one labelled increment per processed event.
///
/// Called synchronously from the collector task: a slow implementation
/// stalls event processing and back-pressures producers.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, family: EventFamily, label: &str);
}

/// Sink that discards every increment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn increment(&self, _family: EventFamily, _label: &str) {}
}

/// Counter families registered with a Prometheus registry.
#[derive(Clone)]
pub struct PrometheusSink {
    pub cache_requests_total: IntCounterVec, // labels: status
    pub errors_total: IntCounterVec,         // labels: kind
    pub requests_total: IntCounterVec,       // labels: category
    pub api_requests_total: IntCounterVec,   // labels: category
}

impl PrometheusSink {
    /// Creates all counter families and registers them with `registry`.
    pub fn new(registry: &Registry, namespace: &str) -> Result<Self, StatusError> {
        let cache_requests_total = IntCounterVec::new(
            Opts::new(
                "cache_requests_total",
                "Skin lookups against the cache by outcome",
            )
            .namespace(namespace),
            &["status"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("errors_total", "Errors recorded by kind").namespace(namespace),
            &["kind"],
        )?;
        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Requests served by category").namespace(namespace),
            &["category"],
        )?;
        let api_requests_total = IntCounterVec::new(
            Opts::new(
                "api_requests_total",
                "Upstream API requests made by category",
            )
            .namespace(namespace),
            &["category"],
        )?;

        registry.register(Box::new(cache_requests_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(api_requests_total.clone()))?;

        Ok(Self {
            cache_requests_total,
            errors_total,
            requests_total,
            api_requests_total,
        })
    }

    fn family(&self, family: EventFamily) -> &IntCounterVec {
        match family {
            EventFamily::Cache => &self.cache_requests_total,
            EventFamily::Error => &self.errors_total,
            EventFamily::Request => &self.requests_total,
            EventFamily::ApiRequest => &self.api_requests_total,
        }
    }
}

impl MetricsSink for PrometheusSink {
    fn increment(&self, family: EventFamily, label: &str) {
        self.family(family).with_label_values(&[label]).inc();
    }
}
