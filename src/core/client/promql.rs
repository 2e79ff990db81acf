//! PromQL expressions for the cAdvisor / node-exporter series the engine reads.

use std::fmt;

/// Window of the `rate()` used for counter metrics.
pub const RATE_WINDOW: &str = "5m";

pub const CLUSTER_CPU_UTILIZATION: &str =
    r#"(1 - avg(rate(node_cpu_seconds_total{mode="idle"}[5m]))) * 100"#;

pub const CLUSTER_MEMORY_UTILIZATION: &str =
    "(1 - (sum(node_memory_MemAvailable_bytes) / sum(node_memory_MemTotal_bytes))) * 100";

/// Cheapest expression the backend can evaluate; used as a liveness probe.
pub const PROBE: &str = "vector(1)";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSelector {
    matchers: Vec<String>,
}

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, label: &str, value: &str) -> Self {
        self.matchers.push(format!(r#"{}="{}""#, label, escape(value)));
        self
    }

    /// Adds `label="value"` only when a non-empty value is given.
    pub fn eq_opt(self, label: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.eq(label, v),
            None => self,
        }
    }

    pub fn ne(mut self, label: &str, value: &str) -> Self {
        self.matchers.push(format!(r#"{}!="{}""#, label, escape(value)));
        self
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matchers.is_empty() {
            return Ok(());
        }
        write!(f, "{{{}}}", self.matchers.join(","))
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', r"\\").replace('"', r#"\""#)
}

pub fn cpu_rate(selector: &LabelSelector) -> String {
    format!("rate(container_cpu_usage_seconds_total{}[{}])", selector, RATE_WINDOW)
}

pub fn memory_usage(selector: &LabelSelector) -> String {
    format!("container_memory_usage_bytes{}", selector)
}

pub fn network_rx_rate(selector: &LabelSelector) -> String {
    format!("rate(container_network_receive_bytes_total{}[{}])", selector, RATE_WINDOW)
}

pub fn network_tx_rate(selector: &LabelSelector) -> String {
    format!("rate(container_network_transmit_bytes_total{}[{}])", selector, RATE_WINDOW)
}

pub fn sum(expr: &str) -> String {
    format!("sum({})", expr)
}
