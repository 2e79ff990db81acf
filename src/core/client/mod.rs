// Collaborator seams
pub mod inventory;
pub mod metrics_source;

// Kube-rs based Kubernetes client
pub mod kube_client;

// Prometheus HTTP client
pub mod prometheus_client;
pub mod prometheus_dto;
pub mod promql;

#[cfg(test)]
pub mod testing;
