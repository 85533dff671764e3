//! Force-directed layout.
//!
//! Nodes start on a square grid, then repel pairwise (`k_r / d²`) and attract
//! along edges (`d · k_a`), both scaled by a temperature that falls linearly to
//! zero. Velocities are damped every step, and a body moves at most
//! `temperature × spacing` per step.
//!
//! Each body is clamped to a box of half-width `WANDER × spacing` around its
//! seed, cut to the canvas. Neighbouring boxes never touch, so bodies end at
//! least `(1 - 2·WANDER) × spacing` apart however hard the crowd pushes them
//! toward a wall.
//!
//! Repulsion is O(n²) per step. Graphs on the dashboard are a few hundred nodes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{AggregatedEdge, ClassifiedNode, LayoutPosition, normalize_id};

/// Simulation constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Number of steps.
	pub iterations: usize,
	/// Repulsion constant `k_r`.
	pub repulsion: f64,
	/// Attraction constant `k_a`.
	pub attraction: f64,
	/// Velocity kept per step, below 1.
	pub damping: f64,
	/// Time step.
	pub dt: f64,
	/// Grid spacing of the initial placement.
	pub spacing: f64,
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			iterations: 80,
			repulsion: 20_000.0,
			attraction: 0.01,
			damping: 0.85,
			dt: 0.1,
			spacing: 80.0,
			width: 1200.0,
			height: 800.0,
		}
	}
}

/// How far a body may drift from its seed, as a fraction of the seed spacing.
/// Below one half, so neighbouring boxes stay disjoint.
const WANDER: f64 = 0.4;

/// Per-node working state for one layout call.
#[derive(Clone, Copy, Debug, Default)]
struct Body {
	x: f64,
	y: f64,
	vx: f64,
	vy: f64,
	fx: f64,
	fy: f64,
	min_x: f64,
	max_x: f64,
	min_y: f64,
	max_y: f64,
}

impl Body {
	fn seeded(x: f64, y: f64, reach: f64, config: &ForceConfig) -> Self {
		Self {
			x,
			y,
			min_x: (x - reach).max(0.0),
			max_x: (x + reach).min(config.width),
			min_y: (y - reach).max(0.0),
			max_y: (y + reach).min(config.height),
			..Self::default()
		}
	}
}

/// Runs the simulation and returns one position per node, in input order.
pub fn layout(nodes: &[ClassifiedNode], edges: &[AggregatedEdge], config: &ForceConfig) -> Vec<LayoutPosition> {
	let (mut bodies, spacing) = seed_grid(nodes.len(), config);
	let springs = resolve_springs(nodes, edges);

	let iterations = config.iterations.max(1) as f64;
	for i in 0..config.iterations {
		let temperature = 1.0 - i as f64 / iterations;
		step(&mut bodies, &springs, temperature, spacing, config);
	}

	nodes
		.iter()
		.zip(&bodies)
		.map(|(node, body)| LayoutPosition {
			node_id: node.id().to_string(),
			x: body.x,
			y: body.y,
		})
		.collect()
}

/// Grid of `ceil(sqrt(n))` columns centred on the canvas, and the spacing used.
/// Spacing shrinks to fit, so no two seeds coincide.
fn seed_grid(n: usize, config: &ForceConfig) -> (Vec<Body>, f64) {
	if n == 0 {
		return (Vec::new(), config.spacing);
	}
	let cols = (n as f64).sqrt().ceil() as usize;
	let rows = n.div_ceil(cols);
	let spacing = config
		.spacing
		.min(config.width / cols as f64)
		.min(config.height / rows as f64);
	let x0 = (config.width - spacing * (cols - 1) as f64) / 2.0;
	let y0 = (config.height - spacing * (rows - 1) as f64) / 2.0;
	let reach = spacing * WANDER;

	let bodies = (0..n)
		.map(|i| {
			let x = x0 + (i % cols) as f64 * spacing;
			let y = y0 + (i / cols) as f64 * spacing;
			Body::seeded(x, y, reach, config)
		})
		.collect();
	(bodies, spacing)
}

/// Edge endpoints as body indices. Edges naming unknown nodes are skipped.
fn resolve_springs(nodes: &[ClassifiedNode], edges: &[AggregatedEdge]) -> Vec<(usize, usize)> {
	let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id(), i)).collect();
	edges
		.iter()
		.filter_map(|edge| {
			let a = *index.get(normalize_id(&edge.source))?;
			let b = *index.get(normalize_id(&edge.target))?;
			(a != b).then_some((a, b))
		})
		.collect()
}

fn step(bodies: &mut [Body], springs: &[(usize, usize)], temperature: f64, spacing: f64, config: &ForceConfig) {
	for body in bodies.iter_mut() {
		body.fx = 0.0;
		body.fy = 0.0;
	}

	let n = bodies.len();
	for a in 0..n {
		for b in (a + 1)..n {
			let (ux, uy, dist) = direction(&bodies[a], &bodies[b], a, b);
			let d = dist.max(1.0);
			let force = config.repulsion / (d * d) * temperature;
			bodies[a].fx -= ux * force;
			bodies[a].fy -= uy * force;
			bodies[b].fx += ux * force;
			bodies[b].fy += uy * force;
		}
	}

	for &(a, b) in springs {
		let (ux, uy, dist) = direction(&bodies[a], &bodies[b], a, b);
		let force = dist * config.attraction * temperature;
		bodies[a].fx += ux * force;
		bodies[a].fy += uy * force;
		bodies[b].fx -= ux * force;
		bodies[b].fy -= uy * force;
	}

	let max_step = spacing * temperature;
	for body in bodies.iter_mut() {
		body.vx = (body.vx + body.fx) * config.damping;
		body.vy = (body.vy + body.fy) * config.damping;

		let (mut dx, mut dy) = (body.vx * config.dt, body.vy * config.dt);
		let len = (dx * dx + dy * dy).sqrt();
		if len > max_step {
			let scale = max_step / len;
			dx *= scale;
			dy *= scale;
			body.vx *= scale;
			body.vy *= scale;
		}

		// max/min rather than clamp: a degenerate canvas must not panic
		body.x = (body.x + dx).max(body.min_x).min(body.max_x);
		body.y = (body.y + dy).max(body.min_y).min(body.max_y);
	}
}

/// Unit vector from `a` to `b` and their distance. Coincident bodies get a
/// fixed direction derived from their indices.
fn direction(a: &Body, b: &Body, ia: usize, ib: usize) -> (f64, f64, f64) {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist > f64::EPSILON {
		return (dx / dist, dy / dist, dist);
	}
	let angle = (ia * 31 + ib * 17) as f64;
	(angle.cos(), angle.sin(), 0.0)
}
