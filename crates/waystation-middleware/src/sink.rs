//! Stats backend seam
//!
//! Middlewares report through [`StatsSink`] with statsd-style `key:value`
//! tags. [`MetricsSink`] forwards to whatever recorder is installed for the
//! `metrics` facade.

use metrics::Label;

/// Destination for timing and gauge values
#[cfg_attr(test, mockall::automock)]
pub trait StatsSink: Send + Sync {
    /// Record a value in a distribution
    fn distribution(&self, name: &str, value: f64, tags: &[String]);

    /// Record a value in a histogram
    fn histogram(&self, name: &str, value: f64, tags: &[String]);

    /// Set a gauge
    fn gauge(&self, name: &str, value: f64, tags: &[String]);
}

/// [`StatsSink`] on top of the `metrics` facade.
///
/// Distributions and histograms both become `metrics` histograms.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSink;

impl MetricsSink {
    /// Create a sink
    pub fn new() -> Self {
        Self
    }
}

impl StatsSink for MetricsSink {
    fn distribution(&self, name: &str, value: f64, tags: &[String]) {
        metrics::histogram!(name.to_string(), labels(tags)).record(value);
    }

    fn histogram(&self, name: &str, value: f64, tags: &[String]) {
        metrics::histogram!(name.to_string(), labels(tags)).record(value);
    }

    fn gauge(&self, name: &str, value: f64, tags: &[String]) {
        metrics::gauge!(name.to_string(), labels(tags)).set(value);
    }
}

/// Split `key:value` tags into labels; a tag without `:` gets an empty value.
pub fn labels(tags: &[String]) -> Vec<Label> {
    tags.iter()
        .map(|tag| match tag.split_once(':') {
            Some((key, value)) => Label::new(key.to_string(), value.to_string()),
            None => Label::new(tag.clone(), String::new()),
        })
        .collect()
}
