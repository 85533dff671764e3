//! Property checks for aggregation, both layouts, and highlighting.

use std::collections::BTreeSet;

use cloudmap_canvas::engine::{
	AggregateOptions, AggregatedEdge, ClassifiedNode, ForceConfig, RawEdge, RawNode, TierId, TierLayoutConfig,
	aggregate, aggregate_to_raw, force, highlight, tier_layout,
};
use proptest::prelude::*;

const KINDS: [&str; 3] = ["ACTUAL_TRAFFIC", "ALLOWED", "PROTECTED_BY"];

fn arb_edges(max_nodes: usize) -> impl Strategy<Value = Vec<RawEdge>> {
	prop::collection::vec(
		(
			0..max_nodes,
			0..max_nodes,
			0..KINDS.len(),
			prop::option::of(0.0f64..50.0),
		),
		0..60,
	)
	.prop_map(|rows| {
		rows.into_iter()
			.map(|(s, t, k, w)| RawEdge {
				source: format!("n{s}"),
				target: format!("n{t}"),
				kind: KINDS[k].to_string(),
				weight: w,
			})
			.collect()
	})
}

fn arb_options() -> impl Strategy<Value = AggregateOptions> {
	(
		0.0f64..10.0,
		prop::option::of(1usize..20),
		prop::option::of(prop::sample::subsequence(KINDS.to_vec(), 1..=KINDS.len())),
	)
		.prop_map(|(min_weight, max_edges, kinds)| AggregateOptions {
			min_weight,
			max_edges,
			kinds: kinds.map(|ks| ks.into_iter().map(String::from).collect::<BTreeSet<_>>()),
		})
}

fn arb_nodes(max: usize) -> impl Strategy<Value = Vec<ClassifiedNode>> {
	prop::collection::vec(0..TierId::ALL.len(), 0..max).prop_map(|tiers| {
		tiers
			.into_iter()
			.enumerate()
			.map(|(i, t)| ClassifiedNode {
				node: RawNode::new(format!("n{i}"), format!("n{i}"), ""),
				tier: TierId::ALL[t],
				label: format!("n{i}"),
			})
			.collect()
	})
}

fn edges_between(n: usize) -> impl Strategy<Value = Vec<AggregatedEdge>> {
	prop::collection::vec((0..n.max(1), 0..n.max(1)), 0..=n * 2).prop_map(|pairs| {
		pairs
			.into_iter()
			.filter(|(a, b)| a != b)
			.map(|(a, b)| AggregatedEdge {
				source: format!("n{a}"),
				target: format!("n{b}"),
				kind: "x".into(),
				count: 1,
				total_weight: 1.0,
			})
			.collect()
	})
}

proptest! {
	#[test]
	fn aggregation_is_idempotent(raw in arb_edges(8), opts in arb_options()) {
		let once = aggregate(&raw, &opts);
		let twice = aggregate(&aggregate_to_raw(&once.edges), &opts);
		prop_assert_eq!(&once.edges, &twice.edges);
		prop_assert_eq!(&once.node_ids, &twice.node_ids);
	}

	#[test]
	fn aggregation_never_emits_self_loops(raw in arb_edges(4), opts in arb_options()) {
		let out = aggregate(&raw, &opts);
		prop_assert!(out.edges.iter().all(|e| e.source != e.target));
	}

	#[test]
	fn aggregation_keeps_one_edge_per_key(raw in arb_edges(6)) {
		let opts = AggregateOptions { max_edges: None, ..AggregateOptions::default() };
		let out = aggregate(&raw, &opts);

		let keys: BTreeSet<_> = out.edges.iter().map(|e| (&e.source, &e.target, &e.kind)).collect();
		prop_assert_eq!(keys.len(), out.edges.len());

		let merged: usize = out.edges.iter().map(|e| e.count).sum();
		prop_assert_eq!(merged + out.self_loops_dropped, raw.len());

		for pair in out.edges.windows(2) {
			prop_assert!(pair[0].total_weight >= pair[1].total_weight);
		}
		prop_assert!(out.edges.iter().all(|e| e.count >= 1 && e.total_weight >= 1.0));
	}

	#[test]
	fn tier_layout_is_deterministic_and_non_overlapping(nodes in arb_nodes(40)) {
		let config = TierLayoutConfig::default();
		let first = tier_layout::layout(&nodes, &config);
		let second = tier_layout::layout(&nodes, &config);
		prop_assert_eq!(&first, &second);

		for (i, a) in first.positions.iter().enumerate() {
			for (j, b) in first.positions.iter().enumerate().skip(i + 1) {
				if nodes[i].tier == nodes[j].tier {
					prop_assert!((a.y - b.y).abs() >= config.node_gap);
					prop_assert_eq!(a.x, b.x);
				} else {
					prop_assert!((a.x - b.x).abs() >= config.lane_gap);
				}
			}
		}
	}

	#[test]
	fn force_layout_stays_finite_in_bounds_and_apart(
		(nodes, edges) in (0usize..60).prop_flat_map(|n| {
			(arb_nodes_exact(n), edges_between(n))
		}),
		iterations in 0usize..120,
	) {
		let config = ForceConfig { iterations, ..ForceConfig::default() };
		let positions = force::layout(&nodes, &edges, &config);
		prop_assert_eq!(positions.len(), nodes.len());
		for p in &positions {
			prop_assert!(p.x.is_finite() && p.y.is_finite());
			prop_assert!((0.0..=config.width).contains(&p.x));
			prop_assert!((0.0..=config.height).contains(&p.y));
		}
		for (i, a) in positions.iter().enumerate() {
			for b in &positions[i + 1..] {
				prop_assert!(((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() > 1.0);
			}
		}
	}

	#[test]
	fn highlight_is_symmetric(edges in edges_between(10)) {
		for edge in &edges {
			prop_assert!(highlight::resolve(Some(edge.source.as_str()), &edges).contains(&edge.target));
			prop_assert!(highlight::resolve(Some(edge.target.as_str()), &edges).contains(&edge.source));
		}
	}
}

fn arb_nodes_exact(n: usize) -> impl Strategy<Value = Vec<ClassifiedNode>> {
	prop::collection::vec(0..TierId::ALL.len(), n).prop_map(|tiers| {
		tiers
			.into_iter()
			.enumerate()
			.map(|(i, t)| ClassifiedNode {
				node: RawNode::new(format!("n{i}"), format!("n{i}"), "EC2"),
				tier: TierId::ALL[t],
				label: format!("n{i}"),
			})
			.collect()
	})
}
