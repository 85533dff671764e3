use std::collections::BTreeSet;

use leptos::prelude::*;

use crate::components::graph_view::GraphView;
use crate::engine::{EngineConfig, GraphInput, LayoutStrategy, RawEdge, RawNode};

const TRAFFIC: &str = "ACTUAL_TRAFFIC";

/// Generate a sample AWS estate: an internet gateway fronting a load balancer,
/// `n` instances behind security groups, roles, and a few buckets.
fn generate_sample_estate(n: usize) -> GraphInput {
	let mut nodes = vec![
		RawNode::new("internet", "Internet", "Internet"),
		RawNode::new("igw-main", "main-igw", "InternetGateway"),
		RawNode::new("alb-web", "web-alb", "LoadBalancer"),
	];
	let mut edges = vec![
		RawEdge::new("internet", "igw-main", TRAFFIC).weighted(500.0),
		RawEdge::new("igw-main", "alb-web", TRAFFIC).weighted(480.0),
	];

	let groups = n.div_ceil(4).max(1);
	for g in 0..groups {
		nodes.push(RawNode::new(format!("sg-{g:03}"), format!("app-sg-{g}"), "SecurityGroup"));
		nodes.push(RawNode::new(
			format!("arn:aws:iam::123456789012:role/app-role-{g}"),
			format!("arn:aws:iam::123456789012:role/app-role-{g}"),
			"IAMRole",
		));
	}
	for b in 0..3 {
		nodes.push(RawNode::new(
			format!("arn:aws:s3:::assets-{b}"),
			format!("arn:aws:s3:::assets-{b}"),
			"S3Bucket",
		));
	}

	for i in 0..n {
		let id = format!("i-{i:04x}");
		let g = i % groups;
		nodes.push(RawNode::new(&id, format!("app-server-{i}"), "EC2"));

		let hits = (rand_simple(i) * 120.0).round();
		edges.push(RawEdge::new("alb-web", &id, TRAFFIC).weighted(hits));
		edges.push(RawEdge::new(&id, format!("sg-{g:03}"), "PROTECTED_BY"));
		edges.push(RawEdge::new(
			&id,
			format!("arn:aws:iam::123456789012:role/app-role-{g}"),
			"ASSUMES",
		));

		// repeated observations of the same flow, merged by the engine
		let bucket = format!("arn:aws:s3:::assets-{}", (rand_simple(i * 7) * 3.0) as usize % 3);
		for call in 0..(1 + i % 3) {
			edges.push(RawEdge::new(&id, &bucket, TRAFFIC).weighted(1.0 + (rand_simple(i + call) * 20.0).round()));
		}
	}

	GraphInput { nodes, edges }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_estate(24));
	let (strategy, set_strategy) = signal(LayoutStrategy::Tiered);
	let (traffic_only, set_traffic_only) = signal(false);

	let config = Signal::derive(move || {
		let mut config = EngineConfig {
			strategy: strategy.get(),
			..EngineConfig::default()
		};
		if traffic_only.get() {
			config.aggregation.kinds = Some(BTreeSet::from([TRAFFIC.to_string()]));
		}
		config
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<GraphView data=graph_data config=config fullscreen=true />
				<div class="graph-overlay">
					<h1>"Cloud Dependency Map"</h1>
					<p class="subtitle">"Hover to trace neighbours. Drag nodes to reposition. Scroll to zoom."</p>
					<button on:click=move |_| set_strategy.update(|s| *s = s.toggled())>
						{move || match strategy.get() {
							LayoutStrategy::Tiered => "Force layout",
							LayoutStrategy::Force => "Tier layout",
						}}
					</button>
					<button on:click=move |_| set_traffic_only.update(|t| *t = !*t)>
						{move || if traffic_only.get() { "All edges" } else { "Traffic only" }}
					</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::{GraphSnapshot, TierId};

	#[test]
	fn sample_estate_spans_every_tier() {
		let snapshot = GraphSnapshot::build(&generate_sample_estate(12), &EngineConfig::default()).unwrap();
		let tiers: Vec<TierId> = snapshot.lanes.iter().map(|lane| lane.tier).collect();
		assert_eq!(tiers, TierId::ALL);
		assert_eq!(snapshot.dangling_edges, 0);
		assert!(snapshot.edges.iter().any(|e| e.count > 1));
	}
}
