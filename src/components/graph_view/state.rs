use std::collections::HashSet;

use crate::engine::{GraphSnapshot, TierId};

pub const NODE_RADIUS: f64 = 8.0;
pub const HIT_RADIUS: f64 = 14.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 10.0;

/// Seconds a dot must stay under the pointer before its highlight starts.
const FADE_IN_DELAY: f64 = 0.08;
const FADE_IN_RATE: f64 = 1.8;
const FADE_OUT_RATE: f64 = 1.26;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

/// What the pointer is currently doing on the canvas.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	/// Dragging a dot; the grab offset is in graph space so the dot does not jump.
	Node { idx: usize, grab_x: f64, grab_y: f64 },
	/// Panning; the anchor is the pointer minus the transform at press time.
	Pan { anchor_x: f64, anchor_y: f64 },
}

/// A focused dot and the dots one edge away from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Focus {
	pub node: usize,
	pub neighbors: HashSet<usize>,
}

/// How a dot is drawn while a focus is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	Dimmed,
	Neighbor,
	Focused,
}

/// The current focus, and the previous one while its highlight fades out.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub current: Option<Focus>,
	pub fading: Option<Focus>,
	/// Highlight strength in `0..=1`.
	pub highlight_t: f64,
	dwell: f64,
}

impl HoverState {
	fn shown(&self) -> Option<&Focus> {
		self.current.as_ref().or(self.fading.as_ref())
	}
}

/// A drawable edge: endpoints as node indices, weight scaled to `0..=1`.
#[derive(Clone, Debug)]
pub struct Link {
	pub from: usize,
	pub to: usize,
	pub intensity: f64,
}

/// Drawable node: tier, label and its (possibly dragged) position.
#[derive(Clone, Debug)]
pub struct Dot {
	pub id: String,
	pub label: String,
	pub tier: TierId,
	pub x: f64,
	pub y: f64,
}

pub struct GraphViewState {
	pub snapshot: GraphSnapshot,
	pub dots: Vec<Dot>,
	pub links: Vec<Link>,
	pub transform: ViewTransform,
	pub gesture: Gesture,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl GraphViewState {
	pub fn new(snapshot: GraphSnapshot, width: f64, height: f64) -> Self {
		let mut state = Self {
			snapshot: GraphSnapshot::default(),
			dots: Vec::new(),
			links: Vec::new(),
			transform: ViewTransform::default(),
			gesture: Gesture::Idle,
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
		};
		state.set_snapshot(snapshot);
		state
	}

	/// Swaps in a freshly built snapshot. Drags, hover and zoom do not carry over.
	pub fn set_snapshot(&mut self, snapshot: GraphSnapshot) {
		self.dots = snapshot
			.nodes
			.iter()
			.zip(&snapshot.positions)
			.map(|(node, pos)| Dot {
				id: node.id().to_string(),
				label: node.label.clone(),
				tier: node.tier,
				x: pos.x,
				y: pos.y,
			})
			.collect();

		let max = snapshot.max_weight.max(f64::EPSILON);
		self.links = snapshot
			.edges
			.iter()
			.filter_map(|edge| {
				Some(Link {
					from: snapshot.index_of(&edge.source)?,
					to: snapshot.index_of(&edge.target)?,
					intensity: edge.total_weight / max,
				})
			})
			.collect();

		self.snapshot = snapshot;
		self.gesture = Gesture::Idle;
		self.hover = HoverState::default();
		self.fit();
	}

	/// Scales and centres the laid-out area in the canvas.
	pub fn fit(&mut self) {
		let (w, h) = (self.snapshot.width.max(1.0), self.snapshot.height.max(1.0));
		let k = (self.width / w).min(self.height / h).clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: (self.width - w * k) / 2.0,
			y: (self.height - h * k) / 2.0,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.dots
			.iter()
			.rposition(|dot| ((dot.x - gx).powi(2) + (dot.y - gy).powi(2)).sqrt() < HIT_RADIUS)
	}

	/// Focuses `node` and its engine neighbourhood; `None` lets the last focus fade.
	pub fn set_hover(&mut self, node: Option<usize>) {
		if self.hover.current.as_ref().map(|f| f.node) == node {
			return;
		}
		let Some((idx, dot)) = node.and_then(|idx| Some((idx, self.dots.get(idx)?))) else {
			self.hover.fading = self.hover.current.take();
			return;
		};

		let neighbors = self
			.snapshot
			.highlight(Some(dot.id.as_str()))
			.iter()
			.filter_map(|id| self.snapshot.index_of(id))
			.filter(|&i| i != idx)
			.collect();
		if self.hover.current.is_none() {
			self.hover.dwell = 0.0;
		}
		self.hover.fading = None;
		self.hover.current = Some(Focus { node: idx, neighbors });
	}

	/// `None` when nothing is focused or fading.
	pub fn emphasis(&self, idx: usize) -> Option<Emphasis> {
		let focus = self.hover.shown()?;
		Some(if focus.node == idx {
			Emphasis::Focused
		} else if focus.neighbors.contains(&idx) {
			Emphasis::Neighbor
		} else {
			Emphasis::Dimmed
		})
	}

	pub fn is_highlighted(&self, idx: usize) -> bool {
		matches!(self.emphasis(idx), Some(Emphasis::Focused | Emphasis::Neighbor))
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.shown().is_some()
	}

	pub fn move_node(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(dot) = self.dots.get_mut(idx) {
			dot.x = x;
			dot.y = y;
		}
	}

	/// Starts a node drag when a dot is under the pointer, a pan otherwise.
	pub fn press(&mut self, sx: f64, sy: f64) {
		self.gesture = match self.node_at_position(sx, sy) {
			Some(idx) => {
				let (gx, gy) = self.screen_to_graph(sx, sy);
				Gesture::Node {
					idx,
					grab_x: self.dots[idx].x - gx,
					grab_y: self.dots[idx].y - gy,
				}
			}
			None => Gesture::Pan {
				anchor_x: sx - self.transform.x,
				anchor_y: sy - self.transform.y,
			},
		};
	}

	pub fn pointer_moved(&mut self, sx: f64, sy: f64) {
		match self.gesture {
			Gesture::Idle => {
				let hovered = self.node_at_position(sx, sy);
				self.set_hover(hovered);
			}
			Gesture::Node { idx, grab_x, grab_y } => {
				let (gx, gy) = self.screen_to_graph(sx, sy);
				self.move_node(idx, gx + grab_x, gy + grab_y);
			}
			Gesture::Pan { anchor_x, anchor_y } => {
				self.transform.x = sx - anchor_x;
				self.transform.y = sy - anchor_y;
			}
		}
	}

	pub fn release(&mut self) {
		self.gesture = Gesture::Idle;
	}

	pub fn leave(&mut self) {
		self.release();
		self.set_hover(None);
	}

	/// Zooms by a fixed step around the pointer, keeping the point under it fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let step = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let k = (self.transform.k * step).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.transform.k;
		self.transform = ViewTransform {
			x: sx - (sx - self.transform.x) * ratio,
			y: sy - (sy - self.transform.y) * ratio,
			k,
		};
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;

		let hover = &mut self.hover;
		if hover.current.is_some() {
			hover.dwell = (hover.dwell + dt).min(FADE_IN_DELAY);
			if hover.dwell >= FADE_IN_DELAY {
				hover.highlight_t += (1.0 - hover.highlight_t) * FADE_IN_RATE * dt;
			}
			return;
		}
		hover.highlight_t -= hover.highlight_t * FADE_OUT_RATE * dt;
		if hover.highlight_t < 0.01 {
			hover.highlight_t = 0.0;
			hover.fading = None;
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit();
	}
}
