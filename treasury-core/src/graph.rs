//! TRSC → PSSC relationship graph with a deterministic polar layout.
//!
//! Routing contracts sit on a ring around the origin, each routing
//! contract's child links on a smaller ring around their parent, and project
//! contracts no routing contract links to on a spiral around the origin.
//! Node and edge sizes grow logarithmically with the ADA amount.
//!
//! The layout depends only on input order; rendering is left to the consumer.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use serde::Serialize;
use tracing::{debug, trace};

use crate::index::ProjectIndex;
use crate::model::{RoutingContract, TreasuryData};

pub const ROUTING_COLOR: &str = "#4f46e5";
pub const PROJECT_COLOR: &str = "#0ea5e9";
pub const UNFUNDED_COLOR: &str = "#94a3b8";
pub const ORPHAN_COLOR: &str = "#38bdf8";
pub const EDGE_COLOR: &str = "rgba(79,70,229,0.25)";

const ROUTING_SIZE: (f64, f64) = (12.0, 18.0);
const CHILD_SIZE: (f64, f64) = (5.0, 12.0);
const ORPHAN_SIZE: (f64, f64) = (4.0, 10.0);

/// Logarithmic visual size for an ADA amount, clamped to `[min, max]`.
///
/// Non-finite and non-positive amounts map to exactly `min`.
pub fn log_size(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return min;
    }
    let size = (value + 10.0).log10() * (min / 1.4);
    size.max(min).min(max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Treasury routing contract.
    Routing,
    /// Project reached through a routing contract's child link.
    Project,
    /// Project contract no routing contract links to.
    Orphan,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed: Option<f64>,
    /// Claimed percentage of budget, rounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub size: f64,
    pub weight: f64,
    pub color: &'static str,
}

/// Node and edge counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub routing: usize,
    pub project: usize,
    pub orphan: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_ids: HashMap<String, usize>,
    #[serde(skip)]
    edge_keys: HashSet<(String, String)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_ids.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_ids.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edge_keys
            .contains(&(source.to_string(), target.to_string()))
    }

    /// Add a node unless its id is already taken. Returns whether it was added.
    fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_ids.contains_key(&node.id) {
            return false;
        }
        self.node_ids.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Add an edge unless the (source, target) pair already exists.
    fn add_edge(&mut self, edge: GraphEdge) -> bool {
        let key = (edge.source.clone(), edge.target.clone());
        if !self.edge_keys.insert(key) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn counts(&self) -> GraphCounts {
        let mut counts = GraphCounts {
            edges: self.edges.len(),
            ..Default::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Routing => counts.routing += 1,
                NodeKind::Project => counts.project += 1,
                NodeKind::Orphan => counts.orphan += 1,
            }
        }
        counts
    }
}

/// Point on a circle of `radius` around `(cx, cy)` at `index / count` of a turn.
fn polar(cx: f64, cy: f64, index: usize, count: usize, radius: f64) -> (f64, f64) {
    let angle = 2.0 * PI * index as f64 / count as f64;
    (cx + angle.cos() * radius, cy + angle.sin() * radius)
}

/// Routing contract positions on the outer ring, in input order.
pub fn position_routing(trsc: &[RoutingContract]) -> Vec<(f64, f64)> {
    if trsc.is_empty() {
        return Vec::new();
    }
    let radius = (trsc.len() as f64 * 6.0).max(12.0);
    (0..trsc.len())
        .map(|i| polar(0.0, 0.0, i, trsc.len(), radius))
        .collect()
}

/// Build the relationship graph for one snapshot.
pub fn build_graph(data: &TreasuryData) -> Graph {
    let mut graph = Graph::new();
    let index = ProjectIndex::new(&data.pssc);
    let positions = position_routing(&data.trsc);

    for (i, (contract, &(x, y))) in data.trsc.iter().zip(&positions).enumerate() {
        let magnitude = contract
            .balance
            .max(contract.incoming_to_trsc.unwrap_or(0.0))
            .max(0.0);
        let added = graph.add_node(GraphNode {
            id: contract.id.clone(),
            kind: NodeKind::Routing,
            label: contract.name.clone(),
            x,
            y,
            size: log_size(magnitude, ROUTING_SIZE.0, ROUTING_SIZE.1),
            color: ROUTING_COLOR,
            highlighted: i == 0,
            budget: None,
            claimed: None,
            progress: None,
        });
        if !added {
            trace!(trsc = %contract.id, "Duplicate routing contract id skipped");
        }
    }

    for (contract, &(parent_x, parent_y)) in data.trsc.iter().zip(&positions) {
        let children = &contract.children;
        let ring_count = children.len().max(1);
        let spread = 3.0 + (children.len() as f64 * 0.45).min(6.0);
        let distance = 4.0 + spread;

        for (j, child) in children.iter().enumerate() {
            if child.id.is_empty() || graph.has_node(&child.id) {
                trace!(trsc = %contract.id, child = %child.id, "Child id already placed, skipping");
                continue;
            }

            let linked = index.get(&child.id);
            let label = child
                .vendor
                .as_deref()
                .or_else(|| linked.and_then(|p| p.project.as_deref()))
                .unwrap_or("Project")
                .replacen("Authentic ", "", 1);
            let budget = child
                .budget_ada
                .or_else(|| linked.and_then(|p| p.budget))
                .or(child.balance)
                .unwrap_or(0.0);
            let claimed = child
                .claimed_ada
                .or_else(|| linked.and_then(|p| p.claimed))
                .unwrap_or(0.0);
            let progress = if budget > 0.0 {
                (claimed / budget * 100.0).round() as i64
            } else {
                0
            };

            let (x, y) = polar(parent_x, parent_y, j, ring_count, distance);
            graph.add_node(GraphNode {
                id: child.id.clone(),
                kind: NodeKind::Project,
                label,
                x,
                y,
                size: log_size(budget.max(0.0), CHILD_SIZE.0, CHILD_SIZE.1),
                color: if budget == 0.0 { UNFUNDED_COLOR } else { PROJECT_COLOR },
                highlighted: false,
                budget: Some(budget),
                claimed: Some(claimed),
                progress: Some(progress),
            });

            graph.add_edge(GraphEdge {
                source: contract.id.clone(),
                target: child.id.clone(),
                size: 0.8 + (log_size(budget, 0.0, 4.0) / 4.0).min(2.5),
                weight: budget,
                color: EDGE_COLOR,
            });
        }
    }

    let orphans: Vec<_> = data
        .pssc
        .iter()
        .filter(|contract| !graph.has_node(&contract.fund_tx))
        .collect();
    for (k, contract) in orphans.iter().enumerate() {
        let (x, y) = polar(0.0, 0.0, k, orphans.len(), 6.0 + k as f64 * 0.4);
        graph.add_node(GraphNode {
            id: contract.fund_tx.clone(),
            kind: NodeKind::Orphan,
            label: contract
                .project
                .clone()
                .unwrap_or_else(|| "Unknown project".to_string()),
            x,
            y,
            size: log_size(contract.budget.unwrap_or(0.0), ORPHAN_SIZE.0, ORPHAN_SIZE.1),
            color: ORPHAN_COLOR,
            highlighted: false,
            budget: contract.budget,
            claimed: contract.claimed,
            progress: None,
        });
    }

    let counts = graph.counts();
    debug!(
        routing = counts.routing,
        projects = counts.project,
        orphans = counts.orphan,
        edges = counts.edges,
        "Built treasury graph"
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildLink, ProjectContract};

    fn child(id: &str, budget: Option<f64>) -> ChildLink {
        ChildLink {
            id: id.to_string(),
            budget_ada: budget,
            ..Default::default()
        }
    }

    fn routing(id: &str, balance: f64, children: Vec<ChildLink>) -> RoutingContract {
        RoutingContract {
            id: id.to_string(),
            name: format!("Routing {id}"),
            balance,
            children,
            ..Default::default()
        }
    }

    fn project(fund_tx: &str, budget: Option<f64>) -> ProjectContract {
        ProjectContract {
            fund_tx: fund_tx.to_string(),
            budget,
            ..Default::default()
        }
    }

    #[test]
    fn test_log_size_floor_cases() {
        assert_eq!(log_size(0.0, 5.0, 12.0), 5.0);
        assert_eq!(log_size(-5.0, 5.0, 12.0), 5.0);
        assert_eq!(log_size(f64::NAN, 5.0, 12.0), 5.0);
        assert_eq!(log_size(f64::INFINITY, 5.0, 12.0), 5.0);
    }

    #[test]
    fn test_log_size_monotonic_and_clamped() {
        let mut previous = log_size(1.0, 5.0, 12.0);
        for exponent in 1..15 {
            let size = log_size(10f64.powi(exponent), 5.0, 12.0);
            assert!(size >= previous);
            assert!(size <= 12.0);
            previous = size;
        }
        assert_eq!(log_size(1e300, 5.0, 12.0), 12.0);
    }

    #[test]
    fn test_two_routing_one_child_each() {
        let data = TreasuryData {
            trsc: vec![
                routing("t1", 100.0, vec![child("a", Some(10.0))]),
                routing("t2", 100.0, vec![child("b", Some(20.0))]),
            ],
            pssc: vec![project("a", Some(10.0)), project("b", Some(20.0))],
            total_treasury_ada: None,
        };

        let graph = build_graph(&data);
        assert_eq!(
            graph.counts(),
            GraphCounts {
                routing: 2,
                project: 2,
                orphan: 0,
                edges: 2
            }
        );
        assert!(graph.has_edge("t1", "a"));
        assert!(graph.has_edge("t2", "b"));
    }

    #[test]
    fn test_routing_ring_layout() {
        let data = TreasuryData {
            trsc: vec![routing("t1", 0.0, vec![]), routing("t2", 0.0, vec![])],
            ..Default::default()
        };
        let graph = build_graph(&data);

        // Two contracts: radius max(12, 12) = 12, angles 0 and π.
        let first = graph.node("t1").unwrap();
        assert!((first.x - 12.0).abs() < 1e-9);
        assert!(first.y.abs() < 1e-9);
        assert!(first.highlighted);
        let second = graph.node("t2").unwrap();
        assert!((second.x + 12.0).abs() < 1e-9);
        assert!(!second.highlighted);
        assert_eq!(first.size, 12.0);
    }

    #[test]
    fn test_child_ring_around_parent() {
        let data = TreasuryData {
            trsc: vec![routing("t1", 0.0, vec![child("a", Some(0.0)), child("b", Some(5e6))])],
            ..Default::default()
        };
        let graph = build_graph(&data);
        let parent = graph.node("t1").unwrap();
        let a = graph.node("a").unwrap();

        // distance = 4 + 3 + min(6, 2 * 0.45)
        let distance = 4.0 + 3.0 + 0.9;
        assert!((a.x - (parent.x + distance)).abs() < 1e-9);
        assert_eq!(a.color, UNFUNDED_COLOR);
        assert_eq!(a.size, 5.0);

        let b = graph.node("b").unwrap();
        assert_eq!(b.color, PROJECT_COLOR);
        assert!(b.size > 5.0);
    }

    #[test]
    fn test_duplicate_ids_never_duplicate_nodes_or_edges() {
        let data = TreasuryData {
            trsc: vec![
                routing("t1", 1.0, vec![child("a", Some(1.0)), child("a", Some(2.0))]),
                routing("t2", 1.0, vec![child("a", Some(3.0)), child("t1", Some(4.0))]),
                routing("t1", 1.0, vec![child("b", Some(5.0))]),
            ],
            pssc: vec![project("a", None), project("b", None), project("a", None)],
            total_treasury_ada: None,
        };
        let graph = build_graph(&data);

        let ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), graph.nodes.len());

        let pairs: HashSet<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs.len(), graph.edges.len());

        // First writer wins: "a" stays attached to t1 with its first budget.
        assert_eq!(graph.node("a").unwrap().budget, Some(1.0));
        assert!(!graph.has_edge("t2", "a"));
        assert_eq!(graph.counts().orphan, 0);
    }

    #[test]
    fn test_orphans_spiral_around_origin() {
        let data = TreasuryData {
            trsc: vec![routing("t1", 1.0, vec![child("a", Some(1.0))])],
            pssc: vec![project("a", Some(1.0)), project("o1", Some(50.0)), project("o2", None)],
            total_treasury_ada: None,
        };
        let graph = build_graph(&data);
        assert_eq!(graph.counts().orphan, 2);

        let o1 = graph.node("o1").unwrap();
        assert!((o1.x - 6.0).abs() < 1e-9);
        assert_eq!(o1.label, "Unknown project");
        let o2 = graph.node("o2").unwrap();
        // Second of two orphans: angle π, distance 6.4.
        assert!((o2.x + 6.4).abs() < 1e-9);
        assert_eq!(o2.size, 4.0);
    }

    #[test]
    fn test_child_label_and_budget_fallbacks() {
        let mut linked = project("a", Some(70.0));
        linked.project = Some("Authentic Wallet".to_string());
        linked.claimed = Some(35.0);
        let data = TreasuryData {
            trsc: vec![routing("t1", 1.0, vec![child("a", None)])],
            pssc: vec![linked],
            total_treasury_ada: None,
        };
        let graph = build_graph(&data);
        let node = graph.node("a").unwrap();
        assert_eq!(node.label, "Wallet");
        assert_eq!(node.budget, Some(70.0));
        assert_eq!(node.progress, Some(50));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let data = TreasuryData {
            trsc: vec![
                routing("t1", 10.0, vec![child("a", Some(1.0)), child("b", Some(2.0))]),
                routing("t2", 20.0, vec![child("c", Some(3.0))]),
            ],
            pssc: vec![project("z", Some(9.0))],
            total_treasury_ada: None,
        };
        let first = build_graph(&data);
        let second = build_graph(&data);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.edges, second.edges);
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&TreasuryData::default());
        assert_eq!(graph.counts(), GraphCounts::default());
    }

    #[test]
    fn test_node_lookup_matches_node_list() {
        let data = TreasuryData {
            trsc: vec![routing("t1", 10.0, vec![child("a", Some(1.0))])],
            pssc: vec![project("z", Some(9.0))],
            total_treasury_ada: None,
        };
        let graph = build_graph(&data);
        for node in graph.nodes() {
            assert_eq!(graph.node(&node.id), Some(node));
        }
        assert!(graph.node("missing").is_none());
        assert_eq!(graph.edges().len(), graph.counts().edges);
    }
}
