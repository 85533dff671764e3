use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{Emphasis, GraphViewState, NODE_RADIUS};
use super::types::TierPalette;

const LANE_HEADER_OFFSET: f64 = 28.0;
const MIN_EDGE_WIDTH: f64 = 1.0;
const MAX_EDGE_WIDTH: f64 = 6.0;
const PARTICLE_BASE_SPEED: f64 = 0.15;
const PARTICLE_SPEED_RANGE: f64 = 0.6;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphViewState, palette: &TierPalette, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&palette.background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_lanes(state, ctx);
	draw_edges(state, palette, ctx);
	draw_nodes(state, palette, ctx);
	ctx.restore();
}

/// Column headers and, between columns, one arrow per direction sized by boundary flow.
fn draw_lanes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let lanes = &state.snapshot.lanes;
	if lanes.is_empty() {
		return;
	}
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 12.0 / k.max(0.5)));
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
	for lane in lanes {
		let _ = ctx.fill_text(
			&format!("{} ({})", lane.tier.label(), lane.len),
			lane.x - NODE_RADIUS,
			LANE_HEADER_OFFSET / 2.0,
		);
	}

	let max = state
		.snapshot
		.boundaries
		.values()
		.map(|f| f.leftward.max(f.rightward))
		.fold(0.0, f64::max);
	if max <= 0.0 {
		return;
	}
	for (pair, (key, flow)) in lanes.windows(2).zip(&state.snapshot.boundaries) {
		debug_assert_eq!((pair[0].tier, pair[1].tier), (key.left, key.right));
		let mid = (pair[0].x + pair[1].x) / 2.0;
		let y = LANE_HEADER_OFFSET;
		draw_boundary_arrow(ctx, mid, y - 4.0, flow.rightward / max, 1.0);
		draw_boundary_arrow(ctx, mid, y + 4.0, flow.leftward / max, -1.0);
	}
}

fn draw_boundary_arrow(ctx: &CanvasRenderingContext2d, x: f64, y: f64, intensity: f64, dir: f64) {
	if intensity <= 0.0 {
		return;
	}
	let (half, width) = (18.0, MIN_EDGE_WIDTH + intensity * (MAX_EDGE_WIDTH - MIN_EDGE_WIDTH));
	ctx.set_stroke_style_str(&format!("rgba(255, 210, 120, {})", 0.3 + 0.6 * intensity));
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(x - half * dir, y);
	ctx.line_to(x + half * dir, y);
	ctx.stroke();
	ctx.begin_path();
	ctx.move_to(x + half * dir, y);
	ctx.line_to(x + (half - 6.0) * dir, y - 4.0);
	ctx.move_to(x + half * dir, y);
	ctx.line_to(x + (half - 6.0) * dir, y + 4.0);
	ctx.stroke();
}

fn draw_edges(state: &GraphViewState, palette: &TierPalette, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();

	for link in &state.links {
		let (n1, n2) = (&state.dots[link.from], &state.dots[link.to]);
		let (dx, dy) = (n2.x - n1.x, n2.y - n1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let is_highlighted = has_highlight && state.is_highlighted(link.from) && state.is_highlighted(link.to);
		let line_width = (MIN_EDGE_WIDTH + link.intensity * (MAX_EDGE_WIDTH - MIN_EDGE_WIDTH)) / k;

		// focused edges brighten toward 0.9 alpha, the rest fade toward 0.15
		let (edge_alpha, arrow_alpha, width) = if is_highlighted {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * (1.0 - 0.3 * t))
		};

		let speed = PARTICLE_BASE_SPEED + PARTICLE_SPEED_RANGE * link.intensity;
		let dash_offset = -(state.flow_time * speed * 200.0) % (dash + gap);

		ctx.set_stroke_style_str(&format!("rgba({}, {})", palette.edge, edge_alpha));
		ctx.set_line_width(width);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(n1.x + ux * NODE_RADIUS, n1.y + uy * NODE_RADIUS);
		ctx.line_to(
			n2.x - ux * (NODE_RADIUS + arrow_size),
			n2.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({}, {})", palette.edge, arrow_alpha));
		let (tip_x, tip_y) = (n2.x - ux * NODE_RADIUS, n2.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		// one particle per edge, travelling source to target
		let phase = (state.flow_time * speed).fract();
		ctx.begin_path();
		let _ = ctx.arc(
			n1.x + dx * phase,
			n1.y + dy * phase,
			(1.5 + 2.0 * link.intensity) / k.max(0.5),
			0.0,
			2.0 * PI,
		);
		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", edge_alpha));
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &GraphViewState, palette: &TierPalette, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for (idx, dot) in state.dots.iter().enumerate() {
		if has_highlight && state.is_highlighted(idx) {
			continue;
		}
		let (alpha, radius) = if has_highlight {
			(1.0 - 0.7 * t, NODE_RADIUS * (1.0 - 0.15 * t))
		} else {
			(1.0, NODE_RADIUS)
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(dot.x, dot.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(palette.color(dot.tier));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&dot.label, dot.x + radius + 3.0, dot.y + 3.0);
	}

	if !has_highlight {
		return;
	}

	for (idx, dot) in state.dots.iter().enumerate() {
		let emphasis = state.emphasis(idx);
		let (radius, glow_radius, glow_alpha) = match emphasis {
			Some(Emphasis::Focused) => (NODE_RADIUS * (1.0 + 0.35 * t), NODE_RADIUS * (1.8 + 1.2 * t), 0.35 * t),
			Some(Emphasis::Neighbor) => (NODE_RADIUS * (1.0 + 0.2 * t), NODE_RADIUS * (1.4 + 0.6 * t), 0.2 * t),
			_ => continue,
		};
		let is_focused = emphasis == Some(Emphasis::Focused);

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(dot.x, dot.y, radius * 0.3, dot.x, dot.y, glow_radius) {
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {glow_alpha})"));
				let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", glow_alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(dot.x, dot.y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(dot.x, dot.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(palette.color(dot.tier));
		ctx.fill();

		if is_focused && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(dot.x, dot.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();

			let totals = state.snapshot.totals_of(&dot.id);
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", 0.8 * t));
			let _ = ctx.fill_text(
				&format!("in {:.0} / out {:.0}", totals.inbound, totals.outbound),
				dot.x + radius + 3.0,
				dot.y + 15.0,
			);
		}

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&dot.label, dot.x + radius + 3.0, dot.y + 3.0);
	}
}
