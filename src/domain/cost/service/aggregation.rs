use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::core::client::inventory::InventorySource;
use crate::domain::cost::model::{CostBreakdown, CostOverview, NamespaceCost, NodeCost, PodCost};
use crate::domain::cost::service::entity_cost::EntityCostCalculator;
use crate::domain::metric::service::usage::FAN_OUT;
use crate::errors::CostError;

// ============================================================
// Pure roll-up
// ============================================================

/// Keeps the successful children in input order, logging the rest.
fn successes<T>(scope: &str, children: Vec<Result<T, CostError>>) -> Vec<T> {
    children
        .into_iter()
        .filter_map(|child| match child {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("Dropping {} child from roll-up: {}", scope, err);
                None
            }
        })
        .collect()
}

/// `pod_count` is taken from the inventory as given, even when some of the
/// children failed.
pub fn roll_up_namespace(
    namespace: &str,
    pod_count: usize,
    children: Vec<Result<PodCost, CostError>>,
) -> NamespaceCost {
    let pods = successes(namespace, children);
    let cost = CostBreakdown::sum(pods.iter().map(|p| &p.cost));

    NamespaceCost {
        namespace: namespace.to_string(),
        cost,
        pod_count,
        pods,
        timestamp: Utc::now(),
    }
}

pub fn roll_up_cluster(children: Vec<Result<NamespaceCost, CostError>>) -> CostOverview {
    let namespace_costs = successes("cluster", children);
    let total_cost = CostBreakdown::sum(namespace_costs.iter().map(|ns| &ns.cost));

    CostOverview {
        total_cost,
        namespace_costs,
        timestamp: Utc::now(),
    }
}

// ============================================================
// Aggregator over live collaborators
// ============================================================

pub struct CostAggregator {
    inventory: Arc<dyn InventorySource>,
    calculator: Arc<EntityCostCalculator>,
}

impl CostAggregator {
    pub fn new(inventory: Arc<dyn InventorySource>, calculator: Arc<EntityCostCalculator>) -> Self {
        Self {
            inventory,
            calculator,
        }
    }

    /// Fails only when the namespace's pods cannot be listed.
    pub async fn aggregate_namespace(&self, namespace: &str) -> Result<NamespaceCost, CostError> {
        let pods = self.inventory.list_pods(namespace).await?;
        debug!("Aggregating {} pods in namespace '{}'", pods.len(), namespace);

        let pod_count = pods.len();
        let calculator = self.calculator.as_ref();
        let children: Vec<_> = stream::iter(pods)
            .map(|pod| async move { calculator.compute_pod_cost(namespace, &pod).await })
            .buffered(FAN_OUT)
            .collect()
            .await;

        Ok(roll_up_namespace(namespace, pod_count, children))
    }

    /// Fails only when namespaces cannot be listed.
    pub async fn aggregate_cluster(&self) -> Result<CostOverview, CostError> {
        let namespaces = self.inventory.list_namespaces().await?;
        debug!("Aggregating {} namespaces", namespaces.len());

        let children: Vec<_> = stream::iter(namespaces)
            .map(|ns| async move { self.aggregate_namespace(&ns).await })
            .buffered(FAN_OUT)
            .collect()
            .await;

        Ok(roll_up_cluster(children))
    }

    pub async fn namespace_costs(&self) -> Result<Vec<NamespaceCost>, CostError> {
        Ok(self.aggregate_cluster().await?.namespace_costs)
    }

    pub async fn pod_costs(&self, namespace: &str) -> Result<Vec<PodCost>, CostError> {
        Ok(self.aggregate_namespace(namespace).await?.pods)
    }

    /// Nodes that cannot be priced are skipped like pods are.
    pub async fn node_costs(&self) -> Result<Vec<NodeCost>, CostError> {
        let nodes = self.inventory.list_nodes().await?;

        let calculator = self.calculator.as_ref();
        let children: Vec<_> = stream::iter(nodes)
            .map(|node| async move { calculator.compute_node_cost(&node).await })
            .buffered(FAN_OUT)
            .collect()
            .await;

        Ok(successes("node", children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::core::client::testing::{StaticInventory, StaticMetrics};
    use crate::domain::cost::model::RateModel;
    use crate::domain::metric::model::MetricKind;
    use crate::domain::metric::service::usage::UsageScope;
    use crate::errors::InventoryError;

    const RATES: RateModel = RateModel {
        cpu_cost_per_core_hour: 1.0,
        memory_cost_per_gb: 1.0,
        storage_cost_per_gb: 0.0,
    };

    fn pod(namespace: &str, name: &str, cpu: f64, memory: f64) -> PodCost {
        PodCost {
            name: name.to_string(),
            namespace: namespace.to_string(),
            cost: CostBreakdown::new(cpu, memory, 0.01, 0.0),
            cpu_usage: cpu,
            memory_usage: 0,
            timestamp: Utc::now(),
        }
    }

    fn aggregator(inventory: StaticInventory, metrics: StaticMetrics) -> CostAggregator {
        let calculator = EntityCostCalculator::new(Arc::new(metrics), Arc::new(RATES));
        CostAggregator::new(Arc::new(inventory), Arc::new(calculator))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn failed_child_is_dropped_but_counted() {
        let ns = roll_up_namespace(
            "shop",
            3,
            vec![
                Ok(pod("shop", "a", 1.0, 0.5)),
                Err(CostError::InvalidScope("b".into())),
                Ok(pod("shop", "c", 2.0, 0.25)),
            ],
        );

        assert_eq!(ns.pod_count, 3);
        assert_eq!(ns.pods.len(), 2);
        assert_eq!(ns.pods[0].name, "a");
        assert_eq!(ns.pods[1].name, "c");
        assert!(close(ns.cost.cpu_cost, 3.0));
        assert!(close(ns.cost.memory_cost, 0.75));
        assert!(close(ns.cost.storage_cost, 0.02));
        assert!(close(ns.cost.total_cost, 3.77));
    }

    #[test]
    fn all_children_failing_is_a_zero_cost_namespace() {
        let ns = roll_up_namespace("shop", 1, vec![Err(CostError::InvalidScope("x".into()))]);

        assert_eq!(ns.pod_count, 1);
        assert!(ns.pods.is_empty());
        assert_eq!(ns.cost, CostBreakdown::default());
    }

    #[test]
    fn cluster_roll_up_keeps_order_and_sums_dimensions() {
        let first = roll_up_namespace("b", 1, vec![Ok(pod("b", "b-0", 1.0, 0.0))]);
        let second = roll_up_namespace("a", 1, vec![Ok(pod("a", "a-0", 0.0, 2.0))]);

        let overview = roll_up_cluster(vec![
            Ok(first),
            Err(CostError::InvalidScope("gone".into())),
            Ok(second),
        ]);

        let names: Vec<_> = overview.namespace_costs.iter().map(|n| n.namespace.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(close(overview.total_cost.cpu_cost, 1.0));
        assert!(close(overview.total_cost.memory_cost, 2.0));
        assert!(close(overview.total_cost.total_cost, 3.02));
    }

    #[test]
    fn empty_cluster_is_zero() {
        let overview = roll_up_cluster(Vec::new());
        assert!(overview.namespace_costs.is_empty());
        assert_eq!(overview.total_cost.total_cost, 0.0);
    }

    #[tokio::test]
    async fn namespace_with_invalid_pod_name_keeps_inventory_count() {
        let scope = UsageScope::pod("shop", "api-0");
        let inventory = StaticInventory::with_namespaces(&["shop"]).pods("shop", &["api-0", "", "api-2"]);
        let metrics = StaticMetrics::default().instant(&scope.expr(MetricKind::Cpu), 0.5);

        let ns = aggregator(inventory, metrics).aggregate_namespace("shop").await.unwrap();

        assert_eq!(ns.pod_count, 3);
        let names: Vec<_> = ns.pods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["api-0", "api-2"]);
        assert!(close(ns.cost.cpu_cost, 0.5));
        assert!(close(ns.cost.storage_cost, 0.02));
    }

    #[tokio::test]
    async fn namespace_fails_when_pods_cannot_be_listed() {
        let inventory = StaticInventory::with_namespaces(&["shop"]).failing_pods("shop");
        let err = aggregator(inventory, StaticMetrics::default())
            .aggregate_namespace("shop")
            .await
            .unwrap_err();
        assert!(matches!(err, CostError::Inventory(InventoryError::Unavailable(_))));
    }

    #[tokio::test]
    async fn cluster_skips_unlistable_namespace() {
        let inventory = StaticInventory::with_namespaces(&["a", "b", "c"])
            .pods("a", &["a-0"])
            .failing_pods("b")
            .pods("c", &["c-0", "c-1"]);

        let overview = aggregator(inventory, StaticMetrics::default())
            .aggregate_cluster()
            .await
            .unwrap();

        let names: Vec<_> = overview.namespace_costs.iter().map(|n| n.namespace.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(overview.namespace_costs[1].pod_count, 2);
        assert!(close(overview.total_cost.storage_cost, 0.03));
    }

    #[tokio::test]
    async fn cluster_fails_when_namespaces_cannot_be_listed() {
        let err = aggregator(StaticInventory::default(), StaticMetrics::default())
            .aggregate_cluster()
            .await
            .unwrap_err();
        assert!(matches!(err, CostError::Inventory(_)));
    }

    #[tokio::test]
    async fn empty_namespace_is_zero_cost() {
        let inventory = StaticInventory::with_namespaces(&["idle"]).pods("idle", &[]);

        let ns = aggregator(inventory, StaticMetrics::default())
            .aggregate_namespace("idle")
            .await
            .unwrap();

        assert_eq!(ns.pod_count, 0);
        assert_eq!(ns.cost.total_cost, 0.0);
    }

    #[tokio::test]
    async fn node_costs_follow_inventory_order() {
        let inventory = StaticInventory::with_namespaces(&[]).nodes(&["n2", "n1"]);
        let metrics = StaticMetrics::default()
            .instant(&UsageScope::node("n1").expr(MetricKind::Cpu), 1.0);

        let nodes = aggregator(inventory, metrics).node_costs().await.unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "n2");
        assert_eq!(nodes[0].cost.total_cost, 0.0);
        assert!(close(nodes[1].cost.cpu_cost, 1.0));
    }

    #[tokio::test]
    async fn slow_children_keep_inventory_order() {
        let slow = UsageScope::node("n2").expr(MetricKind::Cpu);
        let inventory = StaticInventory::with_namespaces(&[]).nodes(&["n2", "n1", "n0"]);
        let metrics = StaticMetrics::default()
            .instant(&slow, 2.0)
            .delayed(&slow, Duration::from_millis(50))
            .instant(&UsageScope::node("n1").expr(MetricKind::Cpu), 1.0);

        let nodes = aggregator(inventory, metrics).node_costs().await.unwrap();

        let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["n2", "n1", "n0"]);
        assert!(close(nodes[0].cost.cpu_cost, 2.0));
        assert!(close(nodes[1].cost.cpu_cost, 1.0));
        assert_eq!(nodes[2].cost.total_cost, 0.0);
    }

    #[tokio::test]
    async fn slow_namespace_keeps_its_place_in_the_overview() {
        let slow = UsageScope::pod("first", "f-0").expr(MetricKind::Cpu);
        let inventory = StaticInventory::with_namespaces(&["first", "second"])
            .pods("first", &["f-0", "f-1"])
            .pods("second", &["s-0"]);
        let metrics = StaticMetrics::default()
            .instant(&slow, 3.0)
            .delayed(&slow, Duration::from_millis(50))
            .instant(&UsageScope::pod("second", "s-0").expr(MetricKind::Cpu), 1.0);

        let overview = aggregator(inventory, metrics).aggregate_cluster().await.unwrap();

        let names: Vec<_> = overview.namespace_costs.iter().map(|n| n.namespace.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        let pods: Vec<_> = overview.namespace_costs[0].pods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(pods, ["f-0", "f-1"]);
        assert!(close(overview.namespace_costs[0].cost.cpu_cost, 3.0));
        assert!(close(overview.namespace_costs[1].cost.cpu_cost, 1.0));
        assert!(close(overview.total_cost.cpu_cost, 4.0));
        assert!(close(overview.total_cost.storage_cost, 0.03));
    }
}
