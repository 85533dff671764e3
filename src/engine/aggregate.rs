//! Edge aggregation.
//!
//! Many raw edges collapse into one weighted edge per `(source, target, kind)`.
//! Filtering by weight runs on the merged totals, and the `max_edges` cap keeps
//! the heaviest edges. Equal totals keep first-seen order.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{AggregatedEdge, RawEdge, normalize_id};

/// Totals below this are raised to it so every edge stays visible.
pub const WEIGHT_FLOOR: f64 = 1.0;

/// Default cap on retained edges.
pub const DEFAULT_MAX_EDGES: usize = 200;

/// Aggregation knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
	/// Drop merged edges whose total is below this.
	pub min_weight: f64,
	/// Keep at most this many edges, heaviest first.
	pub max_edges: Option<usize>,
	/// Only aggregate these kinds; `None` keeps all.
	pub kinds: Option<BTreeSet<String>>,
}

impl Default for AggregateOptions {
	fn default() -> Self {
		Self {
			min_weight: 0.0,
			max_edges: Some(DEFAULT_MAX_EDGES),
			kinds: None,
		}
	}
}

/// Result of one aggregation call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregation {
	/// Merged edges, heaviest first.
	pub edges: Vec<AggregatedEdge>,
	/// Ids touched by a surviving edge, in first-appearance order.
	pub node_ids: Vec<String>,
	/// Raw edges dropped for pointing at their own source.
	pub self_loops_dropped: usize,
	/// Merged edges dropped by `min_weight`.
	pub below_min_weight: usize,
	/// Merged edges dropped by `max_edges`.
	pub truncated: usize,
}

/// Merges, filters, sorts and caps `raw`.
pub fn aggregate(raw: &[RawEdge], opts: &AggregateOptions) -> Aggregation {
	let mut groups: Vec<AggregatedEdge> = Vec::new();
	let mut index: HashMap<(&str, &str, &str), usize> = HashMap::new();
	let mut self_loops_dropped = 0;

	for edge in raw {
		let (source, target, kind) = (
			normalize_id(&edge.source),
			normalize_id(&edge.target),
			edge.kind.trim(),
		);
		if source == target {
			self_loops_dropped += 1;
			continue;
		}
		if let Some(kinds) = &opts.kinds {
			if !kinds.contains(kind) {
				continue;
			}
		}

		let weight = edge.weight.unwrap_or(1.0);
		let slot = *index.entry((source, target, kind)).or_insert_with(|| {
			groups.push(AggregatedEdge {
				source: source.to_string(),
				target: target.to_string(),
				kind: kind.to_string(),
				count: 0,
				total_weight: 0.0,
			});
			groups.len() - 1
		});
		let group = &mut groups[slot];
		group.count += 1;
		group.total_weight += weight;
	}

	// unvalidated input can sum past f64::MAX; saturate instead of going infinite
	for group in &mut groups {
		group.total_weight = group.total_weight.max(WEIGHT_FLOOR).min(f64::MAX);
	}

	let merged = groups.len();
	groups.retain(|edge| edge.total_weight >= opts.min_weight);
	let below_min_weight = merged - groups.len();

	// stable: equal totals keep first-seen order
	groups.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));

	let mut truncated = 0;
	if let Some(max) = opts.max_edges {
		if groups.len() > max {
			truncated = groups.len() - max;
			groups.truncate(max);
		}
	}

	let node_ids = surviving_nodes(&groups);
	debug!(
		"aggregated {} raw edges into {} ({} self-loops, {} below min weight, {} truncated)",
		raw.len(),
		groups.len(),
		self_loops_dropped,
		below_min_weight,
		truncated
	);

	Aggregation {
		edges: groups,
		node_ids,
		self_loops_dropped,
		below_min_weight,
		truncated,
	}
}

fn surviving_nodes(edges: &[AggregatedEdge]) -> Vec<String> {
	let mut seen = BTreeSet::new();
	let mut ids = Vec::new();
	for edge in edges {
		for id in [&edge.source, &edge.target] {
			if seen.insert(id.as_str()) {
				ids.push(id.clone());
			}
		}
	}
	ids
}

/// Expands aggregated edges back into raw ones that aggregate to the same result.
///
/// Each group becomes `count` raw edges; the first carries the whole total and
/// the rest weigh zero, so both `count` and `total_weight` survive a round trip.
pub fn aggregate_to_raw(edges: &[AggregatedEdge]) -> Vec<RawEdge> {
	edges
		.iter()
		.flat_map(|edge| {
			(0..edge.count).map(move |i| {
				let weight = if i == 0 { edge.total_weight } else { 0.0 };
				RawEdge::new(edge.source.clone(), edge.target.clone(), edge.kind.clone()).weighted(weight)
			})
		})
		.collect()
}
