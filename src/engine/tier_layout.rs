//! Column-per-tier layout.
//!
//! Pure and O(n): one lane per non-empty tier, in tier order, nodes stacked in
//! input order. Identical input gives bit-identical output.

use serde::{Deserialize, Serialize};

use super::tier::TierId;
use super::types::{ClassifiedNode, LayoutPosition};

/// Spacing constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierLayoutConfig {
	/// Distance between lane x coordinates.
	pub lane_gap: f64,
	/// Distance between node y coordinates in a lane.
	pub node_gap: f64,
	/// Node box size, used for the extent.
	pub node_size: f64,
	/// Margin around the grid.
	pub padding: f64,
}

impl Default for TierLayoutConfig {
	fn default() -> Self {
		Self {
			lane_gap: 220.0,
			node_gap: 64.0,
			node_size: 36.0,
			padding: 48.0,
		}
	}
}

/// One populated column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TierLane {
	/// Tier shown in this lane.
	pub tier: TierId,
	/// Position among non-empty lanes.
	pub index: usize,
	/// Lane x coordinate.
	pub x: f64,
	/// Number of nodes in the lane.
	pub len: usize,
}

/// Positions plus lane metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TierLayout {
	/// One per input node, in input order.
	pub positions: Vec<LayoutPosition>,
	/// Non-empty lanes, left to right.
	pub lanes: Vec<TierLane>,
	/// Width of the laid-out area including padding.
	pub width: f64,
	/// Height of the laid-out area including padding.
	pub height: f64,
}

/// Places `nodes` in tier columns.
pub fn layout(nodes: &[ClassifiedNode], config: &TierLayoutConfig) -> TierLayout {
	let mut counts = [0usize; TierId::ALL.len()];
	for node in nodes {
		counts[node.tier.order()] += 1;
	}

	let mut lane_of = [0usize; TierId::ALL.len()];
	let mut lanes = Vec::new();
	for tier in TierId::ALL {
		let len = counts[tier.order()];
		if len == 0 {
			continue;
		}
		let index = lanes.len();
		lane_of[tier.order()] = index;
		lanes.push(TierLane {
			tier,
			index,
			x: config.padding + index as f64 * config.lane_gap,
			len,
		});
	}

	let mut next_row = [0usize; TierId::ALL.len()];
	let positions = nodes
		.iter()
		.map(|node| {
			let slot = node.tier.order();
			let row = next_row[slot];
			next_row[slot] += 1;
			LayoutPosition {
				node_id: node.id().to_string(),
				x: config.padding + lane_of[slot] as f64 * config.lane_gap,
				y: config.padding + row as f64 * config.node_gap,
			}
		})
		.collect();

	let tallest = lanes.iter().map(|lane| lane.len).max().unwrap_or(0);
	let span = |count: usize, gap: f64| {
		if count == 0 {
			0.0
		} else {
			(count - 1) as f64 * gap + config.node_size
		}
	};

	TierLayout {
		positions,
		width: 2.0 * config.padding + span(lanes.len(), config.lane_gap),
		height: 2.0 * config.padding + span(tallest, config.node_gap),
		lanes,
	}
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

	#[test]
	fn empty_tiers_leave_no_gap() {
		let config = TierLayoutConfig::default();
		let out = layout(
			&[node("s3", TierId::Storage), node("ext", TierId::External)],
			&config,
		);
		assert_eq!(out.lanes.len(), 2);
		assert_eq!(out.lanes[0].tier, TierId::External);
		assert_eq!(out.positions[1].x, config.padding);
		assert_eq!(out.positions[0].x, config.padding + config.lane_gap);
	}

	#[test]
	fn rows_follow_input_order_within_a_tier() {
		let config = TierLayoutConfig::default();
		let out = layout(
			&[
				node("b", TierId::Compute),
				node("x", TierId::Storage),
				node("a", TierId::Compute),
			],
			&config,
		);
		assert_eq!(out.positions[0].y, config.padding);
		assert_eq!(out.positions[2].y, config.padding + config.node_gap);
		assert_eq!(out.positions[1].y, config.padding);
	}

	#[test]
	fn extent_covers_every_node() {
		let config = TierLayoutConfig::default();
		let out = layout(
			&[
				node("a", TierId::Network),
				node("b", TierId::Network),
				node("c", TierId::Identity),
			],
			&config,
		);
		for p in &out.positions {
			assert!(p.x + config.node_size <= out.width);
			assert!(p.y + config.node_size <= out.height);
		}
	}

	#[test]
	fn empty_input() {
		let out = layout(&[], &TierLayoutConfig::default());
		assert!(out.positions.is_empty());
		assert!(out.lanes.is_empty());
	}
}
