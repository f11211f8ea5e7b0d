use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, WheelEvent};
use yew::prelude::*;

use super::camera_controls::CameraControls;
use super::controls_panel::ControlsPanel;
use super::settings_modal::SettingsModal;
use crate::error::CampaignError;
use crate::map::CampaignMap;
use crate::model::{LAYOUT_HEIGHT, LAYOUT_WIDTH, MapEvent, Vec2, WaypointStatus};

const NUDGE_STEP: f64 = 80.0;
const TOAST_MS: i32 = 2000;
const NODE_RADIUS: f64 = 22.0;

/// The map shared between the component tree and the DOM listeners.
#[derive(Clone)]
pub struct MapHandle(pub Rc<RefCell<CampaignMap>>);

impl MapHandle {
    pub fn new(map: CampaignMap) -> Self {
        Self(Rc::new(RefCell::new(map)))
    }
}

impl PartialEq for MapHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct MapViewProps {
    pub map: MapHandle,
    /// Bumped by the parent whenever progress or settings change.
    pub version: u32,
    pub unlock_all: bool,
    pub on_select: Callback<u32>,
    pub on_toggle_unlock_all: Callback<()>,
    pub on_hard_reset: Callback<()>,
}

/// Canvas pixels per content unit at scale 1, fitting the authoring area.
fn fit_factor(w: f64, h: f64) -> f64 {
    (w / LAYOUT_WIDTH).min(h / LAYOUT_HEIGHT).max(0.25)
}

/// Canvas-relative pixel position to view space (content units around the centre).
fn to_view(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let fit = fit_factor(w, h);
    Vec2::new((client_x - rect.left() - w * 0.5) / fit, (client_y - rect.top() - h * 0.5) / fit)
}

fn status_color(status: WaypointStatus) -> &'static str {
    match status {
        WaypointStatus::Completed => "#3fb950",
        WaypointStatus::Current => "#d29922",
        WaypointStatus::Unlocked => "#58a6ff",
        WaypointStatus::Locked => "#484f58",
    }
}

fn draw_map(canvas: &HtmlCanvasElement, map: &CampaignMap, clock: f64) {
    let Some(ctx) = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        return;
    };
    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let vp = map.viewport();
    let k = vp.scale() * fit_factor(w, h);
    let off = vp.offset();
    let progression = map.progression();

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.set_fill_style_str("#0b0f1a");
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_transform(k, 0.0, 0.0, k, w * 0.5 - off.x * k, h * 0.5 - off.y * k).ok();

    // Connecting path; a segment lights up once its start is cleared.
    let points: Vec<(u32, Vec2)> = map.campaign().ordered_positions().collect();
    ctx.set_line_width(3.0);
    for pair in points.windows(2) {
        let (rank, a) = pair[0];
        let (_, b) = pair[1];
        ctx.set_stroke_style_str(if progression.is_completed(rank) { "#3fb950" } else { "#30363d" });
        ctx.begin_path();
        ctx.move_to(a.x, a.y);
        ctx.line_to(b.x, b.y);
        ctx.stroke();
    }

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for wp in map.campaign().waypoints() {
        let status = map.waypoint_status(wp.rank);
        let p = wp.position;
        if status == WaypointStatus::Current {
            let pulse = NODE_RADIUS + 6.0 + 3.0 * (clock * 3.0).sin();
            ctx.set_stroke_style_str("#d29922");
            ctx.set_line_width(2.0);
            ctx.begin_path();
            ctx.arc(p.x, p.y, pulse, 0.0, std::f64::consts::PI * 2.0).ok();
            ctx.stroke();
        }
        ctx.set_fill_style_str(status_color(status));
        ctx.begin_path();
        ctx.arc(p.x, p.y, NODE_RADIUS, 0.0, std::f64::consts::PI * 2.0).ok();
        ctx.fill();
        ctx.set_fill_style_str("#0b0f1a");
        ctx.set_font("bold 16px sans-serif");
        let mark = if status == WaypointStatus::Locked { "🔒".to_string() } else { wp.rank.to_string() };
        ctx.fill_text(&mark, p.x, p.y).ok();
        ctx.set_fill_style_str("#c9d1d9");
        ctx.set_font("12px sans-serif");
        ctx.fill_text(&wp.display_name, p.x, p.y + NODE_RADIUS + 14.0).ok();
    }

    if progression.is_fresh() {
        if let Ok(first) = map.campaign().position(1) {
            ctx.set_fill_style_str("#d29922");
            ctx.set_font("bold 14px sans-serif");
            let bob = 3.0 * (clock * 4.0).sin();
            ctx.fill_text("START HERE", first.x, first.y - NODE_RADIUS - 18.0 + bob).ok();
        }
    }

    // Scroll indicators in screen space.
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    let room = map.edge_room();
    ctx.set_fill_style_str("rgba(201,209,217,0.45)");
    let arrow = |tip: (f64, f64), a: (f64, f64), b: (f64, f64)| {
        ctx.begin_path();
        ctx.move_to(tip.0, tip.1);
        ctx.line_to(a.0, a.1);
        ctx.line_to(b.0, b.1);
        ctx.close_path();
        ctx.fill();
    };
    let (cx, cy, s) = (w * 0.5, h * 0.5, 12.0);
    if room.left {
        arrow((8.0, cy), (8.0 + s, cy - s), (8.0 + s, cy + s));
    }
    if room.right {
        arrow((w - 8.0, cy), (w - 8.0 - s, cy - s), (w - 8.0 - s, cy + s));
    }
    if room.up {
        arrow((cx, 8.0), (cx - s, 8.0 + s), (cx + s, 8.0 + s));
    }
    if room.down {
        arrow((cx, h - 8.0), (cx - s, h - 8.0 - s), (cx + s, h - 8.0 - s));
    }
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let on_select_ref = use_mut_ref(|| props.on_select.clone());
    *on_select_ref.borrow_mut() = props.on_select.clone();
    let pointers = use_mut_ref(Vec::<(i32, Vec2)>::new);
    let pinching = use_mut_ref(|| false);
    let toast = use_state(|| None::<String>);
    let toast_seq = use_mut_ref(|| 0u32);
    let open_settings = use_state(|| false);

    // Routes engine events to the parent or the locked toast.
    let dispatch: Rc<dyn Fn(Vec<MapEvent>)> = {
        let on_select_ref = on_select_ref.clone();
        let toast = toast.clone();
        let toast_seq = toast_seq.clone();
        Rc::new(move |events: Vec<MapEvent>| {
            for ev in events {
                match ev {
                    MapEvent::WaypointSelected(rank) => {
                        let cb = on_select_ref.borrow().clone();
                        cb.emit(rank);
                    }
                    MapEvent::WaypointRejected { rank, required_rank } => {
                        let err = CampaignError::Locked { rank, required: required_rank };
                        let Some(msg) = err.player_message() else { continue };
                        let seq = {
                            let mut s = toast_seq.borrow_mut();
                            *s += 1;
                            *s
                        };
                        toast.set(Some(msg));
                        let toast = toast.clone();
                        let toast_seq = toast_seq.clone();
                        let hide = Closure::once_into_js(move || {
                            if *toast_seq.borrow() == seq {
                                toast.set(None);
                            }
                        });
                        if let Some(win) = web_sys::window() {
                            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                                hide.unchecked_ref(),
                                TOAST_MS,
                            );
                        }
                    }
                    MapEvent::ScrollChanged(_) | MapEvent::ScrollEnded => {}
                }
            }
        })
    };

    {
        let canvas_ref = canvas_ref.clone();
        let map = props.map.clone();
        let draw_ref_setup = draw_ref.clone();
        let pointers = pointers.clone();
        let pinching = pinching.clone();
        let dispatch = dispatch.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let canvas: HtmlCanvasElement = canvas_ref.cast::<HtmlCanvasElement>().expect("canvas");
            let apply_canvas_size = {
                let canvas = canvas.clone();
                let window = window.clone();
                move || {
                    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
                    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                }
            };
            apply_canvas_size();

            let clock = Rc::new(RefCell::new(0.0f64));
            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let map = map.clone();
                let clock = clock.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    draw_map(&canvas, &map.0.borrow(), *clock.borrow());
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure.clone());
            (draw_closure)();

            // RAF loop: advance glide/tween by real frame time, then draw.
            let raf_id = Rc::new(RefCell::new(None));
            {
                let raf_id_clone = raf_id.clone();
                let draw_ref_loop = draw_ref_setup.clone();
                let window_loop = window.clone();
                let map = map.clone();
                let clock = clock.clone();
                let last_ts = Rc::new(RefCell::new(None::<f64>));
                let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
                let closure_cell_clone = closure_cell.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                    let dt = last_ts.borrow().map(|prev| ((ts - prev) / 1000.0).clamp(0.0, 0.25)).unwrap_or(0.0);
                    *last_ts.borrow_mut() = Some(ts);
                    *clock.borrow_mut() = ts / 1000.0;
                    if dt > 0.0 {
                        let _ = map.0.borrow_mut().tick(dt);
                    }
                    if let Some(f) = &*draw_ref_loop.borrow() {
                        f();
                    }
                    if let Some(cb) = closure_cell_clone.borrow().as_ref() {
                        if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            *raf_id_clone.borrow_mut() = Some(id);
                        }
                    }
                }) as Box<dyn FnMut(f64)>));
                if let Some(cb) = closure_cell.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id.borrow_mut() = Some(id);
                    }
                }
            }

            let pointer_down_cb = {
                let canvas = canvas.clone();
                let map = map.clone();
                let pointers = pointers.clone();
                let pinching = pinching.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: PointerEvent| {
                    if e.pointer_type() == "mouse" && e.button() != 0 {
                        return;
                    }
                    e.prevent_default();
                    let _ = canvas.set_pointer_capture(e.pointer_id());
                    let pos = to_view(&canvas, e.client_x() as f64, e.client_y() as f64);
                    let t = e.time_stamp() / 1000.0;
                    let mut ptrs = pointers.borrow_mut();
                    ptrs.retain(|(id, _)| *id != e.pointer_id());
                    ptrs.push((e.pointer_id(), pos));
                    let events = match ptrs.len() {
                        1 => map.0.borrow_mut().pointer_down(pos, t),
                        2 => {
                            // Second finger: from here on this gesture is a pinch.
                            *pinching.borrow_mut() = true;
                            map.0.borrow_mut().pinch(1.0, 1.0)
                        }
                        _ => Vec::new(),
                    };
                    drop(ptrs);
                    dispatch(events);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("pointerdown", pointer_down_cb.as_ref().unchecked_ref())
                .ok();

            let pointer_move_cb = {
                let canvas = canvas.clone();
                let map = map.clone();
                let pointers = pointers.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: PointerEvent| {
                    let pos = to_view(&canvas, e.client_x() as f64, e.client_y() as f64);
                    let t = e.time_stamp() / 1000.0;
                    let mut ptrs = pointers.borrow_mut();
                    let Some(idx) = ptrs.iter().position(|(id, _)| *id == e.pointer_id()) else {
                        return;
                    };
                    let events = if ptrs.len() >= 2 {
                        let prev = ptrs[0].1.distance(ptrs[1].1);
                        ptrs[idx].1 = pos;
                        let cur = ptrs[0].1.distance(ptrs[1].1);
                        map.0.borrow_mut().pinch(prev, cur)
                    } else {
                        ptrs[idx].1 = pos;
                        map.0.borrow_mut().pointer_move(pos, t)
                    };
                    drop(ptrs);
                    dispatch(events);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("pointermove", pointer_move_cb.as_ref().unchecked_ref())
                .ok();

            let pointer_up_cb = {
                let canvas = canvas.clone();
                let map = map.clone();
                let pointers = pointers.clone();
                let pinching = pinching.clone();
                let dispatch = dispatch.clone();
                Closure::wrap(Box::new(move |e: PointerEvent| {
                    let pos = to_view(&canvas, e.client_x() as f64, e.client_y() as f64);
                    let t = e.time_stamp() / 1000.0;
                    let mut ptrs = pointers.borrow_mut();
                    let before = ptrs.len();
                    ptrs.retain(|(id, _)| *id != e.pointer_id());
                    if ptrs.len() == before {
                        return;
                    }
                    let remaining = ptrs.len();
                    drop(ptrs);
                    let events = if *pinching.borrow() {
                        // A lifted pinch finger must not turn the other one into a fresh drag.
                        if remaining <= 1 {
                            map.0.borrow_mut().pointer_cancel();
                        }
                        if remaining == 0 {
                            *pinching.borrow_mut() = false;
                        }
                        Vec::new()
                    } else if remaining == 0 {
                        map.0.borrow_mut().pointer_up(pos, t)
                    } else {
                        Vec::new()
                    };
                    dispatch(events);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("pointerup", pointer_up_cb.as_ref().unchecked_ref())
                .ok();

            let pointer_cancel_cb = {
                let map = map.clone();
                let pointers = pointers.clone();
                let pinching = pinching.clone();
                Closure::wrap(Box::new(move |_e: PointerEvent| {
                    pointers.borrow_mut().clear();
                    *pinching.borrow_mut() = false;
                    let _ = map.0.borrow_mut().pointer_cancel();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("pointercancel", pointer_cancel_cb.as_ref().unchecked_ref())
                .ok();

            let wheel_cb = {
                let map = map.clone();
                Closure::wrap(Box::new(move |e: WheelEvent| {
                    e.prevent_default();
                    let zoom_change = (-e.delta_y() * 0.001).exp();
                    map.0.borrow_mut().zoom_by(zoom_change);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .ok();

            let contextmenu_cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
                e.prevent_default();
            }) as Box<dyn FnMut(_)>);
            canvas
                .add_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref())
                .ok();

            let resize_cb = {
                let apply_canvas_size = apply_canvas_size.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    apply_canvas_size();
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            // Cleanup
            let window_clone = window.clone();
            move || {
                let _ = canvas
                    .remove_event_listener_with_callback("pointerdown", pointer_down_cb.as_ref().unchecked_ref());
                let _ = canvas
                    .remove_event_listener_with_callback("pointermove", pointer_move_cb.as_ref().unchecked_ref());
                let _ =
                    canvas.remove_event_listener_with_callback("pointerup", pointer_up_cb.as_ref().unchecked_ref());
                let _ = canvas.remove_event_listener_with_callback(
                    "pointercancel",
                    pointer_cancel_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
                let _ = canvas
                    .remove_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref());
                let _ =
                    window_clone.remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                if let Some(id) = *raf_id.borrow() {
                    let _ = window_clone.cancel_animation_frame(id);
                }
                *draw_ref_setup.borrow_mut() = None;
            }
        });
    }

    let nudge_cb = |dx: f64, dy: f64| {
        let map = props.map.clone();
        Callback::from(move |()| {
            let _ = map.0.borrow_mut().nudge(Vec2::new(dx, dy));
        })
    };
    let zoom_cb = |factor: f64| {
        let map = props.map.clone();
        Callback::from(move |()| {
            map.0.borrow_mut().zoom_by(factor);
        })
    };
    let center_cb = {
        let map = props.map.clone();
        Callback::from(move |()| map.0.borrow_mut().focus_current())
    };
    let open_settings_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(true))
    };
    let close_settings_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(false))
    };
    let hard_reset_cb = {
        let open_settings = open_settings.clone();
        let cb = props.on_hard_reset.clone();
        Callback::from(move |()| {
            open_settings.set(false);
            cb.emit(());
        })
    };

    let (cleared, total, frontier_name) = {
        let m = props.map.0.borrow();
        let p = m.progression();
        let name = m
            .campaign()
            .waypoint(p.highest_unlocked_rank())
            .map(|w| w.display_name.clone())
            .unwrap_or_default();
        (p.completed_ranks().count() as u32, p.total(), name)
    };

    html! {<div style="position:relative; width:100vw; height:100vh; overflow:hidden;">
        <canvas ref={canvas_ref.clone()} id="map-canvas" style="display:block; width:100%; height:100%; touch-action:none;"></canvas>
        <ControlsPanel cleared={cleared} total={total} frontier_name={frontier_name} unlock_all={props.unlock_all} toast={(*toast).clone()} on_open_settings={open_settings_cb} />
        <CameraControls on_zoom_in={zoom_cb(1.25)} on_zoom_out={zoom_cb(0.8)} on_pan_left={nudge_cb(-NUDGE_STEP, 0.0)} on_pan_right={nudge_cb(NUDGE_STEP, 0.0)} on_pan_up={nudge_cb(0.0, -NUDGE_STEP)} on_pan_down={nudge_cb(0.0, NUDGE_STEP)} on_center={center_cb} />
        <SettingsModal show={*open_settings} on_close={close_settings_cb} unlock_all={props.unlock_all} on_toggle_unlock_all={props.on_toggle_unlock_all.clone()} on_hard_reset={hard_reset_cb} />
    </div>}
}
