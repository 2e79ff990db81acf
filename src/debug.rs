use tracing::{info, warn};

use crate::app_state::AppState;

/// Runs only when in KUBUDGET_DEBUG_MODE: prices the cluster once and logs it.
pub async fn run_debug(state: &AppState) {
    info!("🔧 Debug mode: computing one cost overview...");

    match state.cost_service.overview().await {
        Ok(overview) => {
            info!(
                "Cluster cost {:.6}/h across {} namespaces",
                overview.total_cost.total_cost,
                overview.namespace_costs.len()
            );
            for ns in &overview.namespace_costs {
                info!(
                    "  {}: {:.6}/h ({} of {} pods priced)",
                    ns.namespace,
                    ns.cost.total_cost,
                    ns.pods.len(),
                    ns.pod_count
                );
            }
        }
        Err(err) => warn!("Cost overview failed: {}", err),
    }

    info!("Debug tasks completed. Exiting...");
}
