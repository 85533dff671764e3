//! One pass from raw input to everything the view draws.
//!
//! A snapshot is rebuilt from scratch whenever input or config changes.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, info};

use super::aggregate::{self, Aggregation};
use super::config::{EngineConfig, LayoutStrategy};
use super::error::ValidationError;
use super::flows::{self, FlowTotals, TierBoundaryFlow, TierPairKey};
use super::force;
use super::highlight;
use super::tier::TierClassifier;
use super::tier_layout::{self, TierLane};
use super::types::{AggregatedEdge, ClassifiedNode, GraphInput, LayoutPosition, RawEdge, normalize_id};

/// Derived state for one input snapshot.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
	/// Nodes in view, in input order.
	pub nodes: Vec<ClassifiedNode>,
	/// Filtered, merged edges, heaviest first.
	pub edges: Vec<AggregatedEdge>,
	/// One position per node in `nodes`.
	pub positions: Vec<LayoutPosition>,
	/// Tier columns; empty for the force layout.
	pub lanes: Vec<TierLane>,
	/// Inbound/outbound weight per node id.
	pub totals: HashMap<String, FlowTotals>,
	/// Weight crossing each adjacent tier boundary.
	pub boundaries: BTreeMap<TierPairKey, TierBoundaryFlow>,
	/// Heaviest edge weight, zero without edges.
	pub max_weight: f64,
	/// Raw edges dropped because an endpoint is not a known node.
	pub dangling_edges: usize,
	/// Layout that produced `positions`.
	pub strategy: LayoutStrategy,
	/// Width of the laid-out area.
	pub width: f64,
	/// Height of the laid-out area.
	pub height: f64,
	index: HashMap<String, usize>,
}

impl GraphSnapshot {
	/// Validates `input` and `config`, then runs the whole pipeline.
	pub fn build(input: &GraphInput, config: &EngineConfig) -> Result<Self, ValidationError> {
		input.validate()?;
		config.validate()?;

		let classifier = TierClassifier::new(config.classifier.clone());
		let classified = classifier.classify_all(&input.nodes);

		let (known, dangling_edges) = prune_dangling(&classified, &input.edges);
		let Aggregation { edges, node_ids, .. } = aggregate::aggregate(&known, &config.aggregation);

		let nodes: Vec<ClassifiedNode> = if config.keep_isolated_nodes {
			classified
		} else {
			let linked: HashSet<&str> = node_ids.iter().map(String::as_str).collect();
			classified.into_iter().filter(|n| linked.contains(n.id())).collect()
		};

		let (positions, lanes, width, height) = match config.strategy {
			LayoutStrategy::Tiered => {
				let out = tier_layout::layout(&nodes, &config.tiers);
				(out.positions, out.lanes, out.width, out.height)
			}
			LayoutStrategy::Force => (
				force::layout(&nodes, &edges, &config.force),
				Vec::new(),
				config.force.width,
				config.force.height,
			),
		};

		let totals = flows::flow_totals(&edges);
		let boundaries = flows::summarize(&nodes, &edges);
		let max_weight = flows::max_edge_weight(&edges);
		let index = positions
			.iter()
			.enumerate()
			.map(|(i, p)| (p.node_id.clone(), i))
			.collect();

		info!(
			"built {:?} snapshot: {} nodes, {} edges, {} boundaries",
			config.strategy,
			nodes.len(),
			edges.len(),
			boundaries.len()
		);

		Ok(Self {
			nodes,
			edges,
			positions,
			lanes,
			totals,
			boundaries,
			max_weight,
			dangling_edges,
			strategy: config.strategy,
			width,
			height,
			index,
		})
	}

	/// Position of a node by id.
	pub fn position(&self, id: &str) -> Option<&LayoutPosition> {
		self.index.get(normalize_id(id)).map(|&i| &self.positions[i])
	}

	/// Index of a node by id into `nodes` and `positions`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(normalize_id(id)).copied()
	}

	/// Focused node plus its neighbours over this snapshot's edges.
	pub fn highlight(&self, focused: Option<&str>) -> HashSet<String> {
		highlight::resolve(focused, &self.edges)
	}

	/// Totals for one node; zero when it has no edges.
	pub fn totals_of(&self, id: &str) -> FlowTotals {
		self.totals.get(normalize_id(id)).copied().unwrap_or_default()
	}
}

/// Splits off edges whose endpoints are not in `nodes`.
fn prune_dangling(nodes: &[ClassifiedNode], edges: &[RawEdge]) -> (Vec<RawEdge>, usize) {
	let ids: HashSet<&str> = nodes.iter().map(ClassifiedNode::id).collect();
	let known: Vec<RawEdge> = edges
		.iter()
		.filter(|e| ids.contains(normalize_id(&e.source)) && ids.contains(normalize_id(&e.target)))
		.cloned()
		.collect();
	let dangling = edges.len() - known.len();
	if dangling > 0 {
		debug!("dropped {dangling} edges with unknown endpoints");
	}
	(known, dangling)
}
