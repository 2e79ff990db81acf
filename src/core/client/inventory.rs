use std::fmt::Debug;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::api::ListParams;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::InventoryError;

/// Cluster topology. Every listing keeps the order the cluster API returned.
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, InventoryError>;

    async fn list_pods(&self, namespace: &str) -> Result<Vec<String>, InventoryError>;

    async fn list_nodes(&self) -> Result<Vec<String>, InventoryError>;
}

/// Inventory backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeInventory {
    client: Client,
}

impl KubeInventory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Lists a resource kind and keeps only the object names, in API order.
async fn fetch_names<K>(api: Api<K>, what: &str) -> Result<Vec<String>>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let list = api.list(&ListParams::default()).await?;
    debug!("Discovered {} {}", list.items.len(), what);
    Ok(names_of(list.items))
}

fn names_of<K: Resource>(items: Vec<K>) -> Vec<String> {
    items
        .iter()
        .map(|item| item.name_any())
        .filter(|name| !name.is_empty())
        .collect()
}

fn unavailable(what: &str, err: anyhow::Error) -> InventoryError {
    warn!("Failed to list {}: {:#}", what, err);
    InventoryError::Unavailable(format!("failed to list {}: {:#}", what, err))
}

#[async_trait]
impl InventorySource for KubeInventory {
    async fn list_namespaces(&self) -> Result<Vec<String>, InventoryError> {
        fetch_names(Api::<Namespace>::all(self.client.clone()), "namespace(s)")
            .await
            .map_err(|e| unavailable("namespaces", e))
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<String>, InventoryError> {
        let what = format!("pod(s) in namespace '{}'", namespace);
        fetch_names(Api::<Pod>::namespaced(self.client.clone(), namespace), &what)
            .await
            .map_err(|e| unavailable(&what, e))
    }

    async fn list_nodes(&self) -> Result<Vec<String>, InventoryError> {
        fetch_names(Api::<Node>::all(self.client.clone()), "node(s)")
            .await
            .map_err(|e| unavailable("nodes", e))
    }
}
