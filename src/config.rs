//! Process configuration, read once from the environment at startup.
//!
//! `RUST_LOG` and `LOG_DIR` are read by the logging setup in `main`, before
//! this is loaded, so that fallback warnings are not lost.

use std::{env, time::Duration};

use tracing::warn;

use crate::domain::cost::model::RateModel;

const DEFAULT_PROMETHEUS_URL: &str = "http://localhost:9090";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CPU_COST_PER_HOUR: f64 = 0.048;
const DEFAULT_MEMORY_COST_PER_GB: f64 = 0.0067;
const DEFAULT_STORAGE_COST_PER_GB: f64 = 0.00014;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub prometheus_url: String,
    /// Explicit kubeconfig; `None` lets kube infer (kubeconfig or in-cluster).
    pub kube_config_path: Option<String>,
    pub port: u16,
    pub cpu_cost_per_hour: f64,
    pub memory_cost_per_gb: f64,
    pub storage_cost_per_gb: f64,
    /// Upper bound for a whole HTTP request, collaborator calls included.
    pub request_timeout: Duration,
    pub prometheus_timeout: Duration,
    pub debug_mode: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            prometheus_url: non_empty("PROMETHEUS_URL")
                .unwrap_or_else(|| DEFAULT_PROMETHEUS_URL.to_string()),
            kube_config_path: non_empty("KUBE_CONFIG_PATH"),
            port: parse_or("PORT", non_empty("PORT"), DEFAULT_PORT),
            cpu_cost_per_hour: parse_or(
                "CPU_COST_PER_HOUR",
                non_empty("CPU_COST_PER_HOUR"),
                DEFAULT_CPU_COST_PER_HOUR,
            ),
            memory_cost_per_gb: parse_or(
                "MEMORY_COST_PER_GB",
                non_empty("MEMORY_COST_PER_GB"),
                DEFAULT_MEMORY_COST_PER_GB,
            ),
            storage_cost_per_gb: parse_or(
                "STORAGE_COST_PER_GB",
                non_empty("STORAGE_COST_PER_GB"),
                DEFAULT_STORAGE_COST_PER_GB,
            ),
            request_timeout: duration_or(
                "REQUEST_TIMEOUT",
                non_empty("REQUEST_TIMEOUT"),
                DEFAULT_TIMEOUT,
            ),
            prometheus_timeout: duration_or(
                "PROMETHEUS_TIMEOUT",
                non_empty("PROMETHEUS_TIMEOUT"),
                DEFAULT_TIMEOUT,
            ),
            debug_mode: non_empty("KUBUDGET_DEBUG_MODE").is_some(),
        }
    }

    pub fn rate_model(&self) -> RateModel {
        RateModel {
            cpu_cost_per_core_hour: self.cpu_cost_per_hour,
            memory_cost_per_gb: self.memory_cost_per_gb,
            storage_cost_per_gb: self.storage_cost_per_gb,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}, using default", key, value);
            default
        }),
        None => default,
    }
}

fn duration_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    match raw {
        Some(value) => humantime::parse_duration(value.trim()).unwrap_or_else(|err| {
            warn!("Ignoring invalid duration {}={:?}: {}", key, value, err);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.prometheus_url, "http://localhost:9090");
        assert_eq!(cfg.kube_config_path, None);
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(!cfg.debug_mode);

        let rates = cfg.rate_model();
        assert_eq!(rates.cpu_cost_per_core_hour, 0.048);
        assert_eq!(rates.memory_cost_per_gb, 0.0067);
        assert_eq!(rates.storage_cost_per_gb, 0.00014);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config_from(&[
            ("PROMETHEUS_URL", "http://prom:9090"),
            ("KUBE_CONFIG_PATH", "/tmp/kubeconfig"),
            ("PORT", "9000"),
            ("CPU_COST_PER_HOUR", "0.1"),
            ("REQUEST_TIMEOUT", "5s"),
            ("KUBUDGET_DEBUG_MODE", "1"),
        ]);
        assert_eq!(cfg.prometheus_url, "http://prom:9090");
        assert_eq!(cfg.kube_config_path.as_deref(), Some("/tmp/kubeconfig"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.cpu_cost_per_hour, 0.1);
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert!(cfg.debug_mode);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = config_from(&[
            ("PORT", "eighty"),
            ("MEMORY_COST_PER_GB", "cheap"),
            ("PROMETHEUS_TIMEOUT", "soon"),
            ("KUBE_CONFIG_PATH", "   "),
        ]);
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.memory_cost_per_gb, 0.0067);
        assert_eq!(cfg.prometheus_timeout, Duration::from_secs(30));
        assert_eq!(cfg.kube_config_path, None);
    }
}
