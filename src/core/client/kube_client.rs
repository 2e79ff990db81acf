use anyhow::Result;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::{debug, warn};

/// Creates a Kubernetes client.
///
/// An explicit kubeconfig path wins; if it cannot be loaded, or none is given,
/// the usual inference applies (`KUBECONFIG`, `~/.kube/config`, in-cluster).
pub async fn build_kube_client(kube_config_path: Option<&str>) -> Result<Client> {
    if let Some(path) = kube_config_path {
        match client_from_kubeconfig(path).await {
            Ok(client) => {
                debug!("Kubernetes client initialized from {}", path);
                return Ok(client);
            }
            Err(e) => warn!("Failed to load kubeconfig {}: {:#}; falling back", path, e),
        }
    }

    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");
    Ok(client)
}

async fn client_from_kubeconfig(path: &str) -> Result<Client> {
    let kubeconfig = Kubeconfig::read_from(path)?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    Ok(Client::try_from(config)?)
}
