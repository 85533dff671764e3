use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::GraphViewState;
use super::types::TierPalette;
use crate::engine::{EngineConfig, GraphInput, GraphSnapshot};

/// Builds a snapshot, falling back to an empty one when the input is rejected.
fn build_snapshot(input: &GraphInput, config: &EngineConfig) -> GraphSnapshot {
	match GraphSnapshot::build(input, config) {
		Ok(snapshot) => snapshot,
		Err(err) => {
			error!("graph input rejected: {err}");
			GraphSnapshot::default()
		}
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

#[component]
pub fn GraphView(
	#[prop(into)] data: Signal<GraphInput>,
	#[prop(into)] config: Signal<EngineConfig>,
	#[prop(optional)] palette: TierPalette,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphViewState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let snapshot = build_snapshot(&data.get(), &config.get());

		// Loop already running: only the snapshot changes.
		if let Some(s) = state_init.borrow_mut().as_mut() {
			s.set_snapshot(snapshot);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		*state_init.borrow_mut() = Some(GraphViewState::new(snapshot, w, h));
		info!("graph view mounted at {w}x{h}");

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, palette) = (state_init.clone(), animate_init.clone(), palette.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &palette, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Every pointer handler resolves the canvas-relative point and forwards it.
	let with_point = {
		let state = state.clone();
		move |ev: &MouseEvent, apply: fn(&mut GraphViewState, f64, f64)| {
			let Some(canvas) = canvas_ref.get() else {
				return;
			};
			let (x, y) = canvas_point(&canvas.into(), ev);
			if let Some(s) = state.borrow_mut().as_mut() {
				apply(s, x, y);
			}
		}
	};

	let on_mousedown = {
		let with_point = with_point.clone();
		move |ev: MouseEvent| with_point(&ev, GraphViewState::press)
	};
	let on_mousemove = {
		let with_point = with_point.clone();
		move |ev: MouseEvent| with_point(&ev, GraphViewState::pointer_moved)
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if ev.delta_y() > 0.0 {
			with_point(&ev, |s, x, y| s.zoom_at(x, y, 1.0));
		} else {
			with_point(&ev, |s, x, y| s.zoom_at(x, y, -1.0));
		}
	};

	let state_up = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(s) = state_up.borrow_mut().as_mut() {
			s.release();
		}
	};
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = state.borrow_mut().as_mut() {
			s.leave();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-view-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
