//! Per-node and per-boundary flow totals.
//!
//! An edge crossing several tier boundaries counts toward each of them.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::tier::TierId;
use super::types::{AggregatedEdge, ClassifiedNode, normalize_id};

/// Weight entering and leaving one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FlowTotals {
	/// Sum over edges targeting the node.
	pub inbound: f64,
	/// Sum over edges leaving the node.
	pub outbound: f64,
}

impl FlowTotals {
	/// Both directions together.
	pub fn total(&self) -> f64 {
		self.inbound + self.outbound
	}
}

/// The gap between two adjacent non-empty tiers, `left` before `right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TierPairKey {
	/// Tier on the left of the boundary.
	pub left: TierId,
	/// Tier on the right of the boundary.
	pub right: TierId,
}

/// Weight crossing one boundary, split by direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TierBoundaryFlow {
	/// Edges whose source tier is right of their target tier.
	pub leftward: f64,
	/// Edges whose source tier is left of their target tier.
	pub rightward: f64,
}

/// Folds edge weights by source and target.
pub fn flow_totals(edges: &[AggregatedEdge]) -> HashMap<String, FlowTotals> {
	let mut totals: HashMap<String, FlowTotals> = HashMap::new();
	for edge in edges {
		totals
			.entry(normalize_id(&edge.source).to_string())
			.or_default()
			.outbound += edge.total_weight;
		totals
			.entry(normalize_id(&edge.target).to_string())
			.or_default()
			.inbound += edge.total_weight;
	}
	totals
}

/// Heaviest edge, for scaling thickness and particle speed. Zero when empty.
pub fn max_edge_weight(edges: &[AggregatedEdge]) -> f64 {
	edges.iter().map(|e| e.total_weight).fold(0.0, f64::max)
}

/// Flow across every boundary between adjacent non-empty tiers.
///
/// Edges with an endpoint outside `nodes`, or both endpoints in one tier,
/// cross nothing.
pub fn summarize(nodes: &[ClassifiedNode], edges: &[AggregatedEdge]) -> BTreeMap<TierPairKey, TierBoundaryFlow> {
	let tier_of: HashMap<&str, TierId> = nodes.iter().map(|n| (n.id(), n.tier)).collect();

	let mut present = [false; TierId::ALL.len()];
	for node in nodes {
		present[node.tier.order()] = true;
	}
	let lanes: Vec<TierId> = TierId::ALL.into_iter().filter(|t| present[t.order()]).collect();
	let mut lane_of = [0usize; TierId::ALL.len()];
	for (i, tier) in lanes.iter().enumerate() {
		lane_of[tier.order()] = i;
	}

	let mut boundaries = vec![TierBoundaryFlow::default(); lanes.len().saturating_sub(1)];
	for edge in edges {
		let (Some(&from), Some(&to)) = (
			tier_of.get(normalize_id(&edge.source)),
			tier_of.get(normalize_id(&edge.target)),
		) else {
			continue;
		};
		let (a, b) = (lane_of[from.order()], lane_of[to.order()]);
		if a < b {
			for boundary in &mut boundaries[a..b] {
				boundary.rightward += edge.total_weight;
			}
		} else if a > b {
			for boundary in &mut boundaries[b..a] {
				boundary.leftward += edge.total_weight;
			}
		}
	}

	lanes
		.windows(2)
		.zip(boundaries)
		.map(|(pair, flow)| {
			(
				TierPairKey {
					left: pair[0],
					right: pair[1],
				},
				flow,
			)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::types::RawNode;

	fn node(id: &str, tier: TierId) -> ClassifiedNode {
		ClassifiedNode {
			node: RawNode::new(id, id, ""),
			tier,
			label: id.into(),
		}
	}

	fn edge(a: &str, b: &str, w: f64) -> AggregatedEdge {
		AggregatedEdge {
			source: a.into(),
			target: b.into(),
			kind: "x".into(),
			count: 1,
			total_weight: w,
		}
	}

	fn key(left: TierId, right: TierId) -> TierPairKey {
		TierPairKey { left, right }
	}

	#[test]
	fn chain_assigns_each_hop_to_its_boundary() {
		let nodes = [
			node("a", TierId::External),
			node("b", TierId::Compute),
			node("c", TierId::Storage),
		];
		let flows = summarize(&nodes, &[edge("a", "b", 4.0), edge("b", "c", 2.0)]);
		assert_eq!(flows.len(), 2);
		let ab = flows[&key(TierId::External, TierId::Compute)];
		assert_eq!(ab.rightward, 4.0);
		assert_eq!(ab.leftward, 0.0);
		assert_eq!(flows[&key(TierId::Compute, TierId::Storage)].rightward, 2.0);
	}

	#[test]
	fn spanning_edges_count_at_every_boundary() {
		let nodes = [
			node("a", TierId::External),
			node("b", TierId::Compute),
			node("c", TierId::Storage),
		];
		let flows = summarize(&nodes, &[edge("c", "a", 3.0)]);
		for flow in flows.values() {
			assert_eq!(flow.leftward, 3.0);
			assert_eq!(flow.rightward, 0.0);
		}
	}

	#[test]
	fn same_tier_and_dangling_edges_cross_nothing() {
		let nodes = [node("a", TierId::Compute), node("b", TierId::Compute), node("c", TierId::Storage)];
		let flows = summarize(&nodes, &[edge("a", "b", 5.0), edge("a", "ghost", 7.0)]);
		let flow = flows[&key(TierId::Compute, TierId::Storage)];
		assert_eq!(flow, TierBoundaryFlow::default());
	}

	#[test]
	fn empty_tiers_are_skipped() {
		let nodes = [node("a", TierId::External), node("c", TierId::Storage)];
		let flows = summarize(&nodes, &[edge("a", "c", 1.0)]);
		assert_eq!(flows.keys().copied().collect::<Vec<_>>(), [key(TierId::External, TierId::Storage)]);
	}

	#[test]
	fn totals_fold_by_endpoint() {
		let totals = flow_totals(&[edge("a", "b", 2.0), edge("a", "c", 3.0), edge("c", "a", 1.0)]);
		assert_eq!(totals["a"].outbound, 5.0);
		assert_eq!(totals["a"].inbound, 1.0);
		assert_eq!(totals["c"].total(), 4.0);
		assert_eq!(max_edge_weight(&[edge("a", "b", 2.0), edge("a", "c", 3.0)]), 3.0);
		assert_eq!(max_edge_weight(&[]), 0.0);
	}
}
