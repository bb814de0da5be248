use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use leptos::ev::{MouseEvent, PointerEvent};
use leptos::html::Div;
use leptos::svg::Svg;
use leptos::prelude::*;
use ukmap_shared::colors::STROKE;
use ukmap_shared::debounce::ResizeDebounce;
use wasm_bindgen::prelude::*;

use crate::app::{Hovered, MousePos};
use crate::controller::{MapController, now_ms};

/// Pointer travel (px) beyond which a press counts as a drag, not a click.
const CLICK_SLOP_PX: f64 = 5.0;

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn unbind_resize() {
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old.handler.as_ref().unchecked_ref());
        }
    });
}

fn measured_width(container: NodeRef<Div>) -> f64 {
    container
        .get_untracked()
        .map(|el| el.client_width() as f64)
        .unwrap_or(0.0)
}

/// Pointer bookkeeping for drag-to-pan and the click slop check.
#[derive(Clone, Copy, Debug, Default)]
struct Gesture {
    pointers: u32,
    dragging: bool,
    start: (f64, f64),
    last: (f64, f64),
    pinch_dist: f64,
}

impl Gesture {
    fn is_click(&self, x: f64, y: f64) -> bool {
        (x - self.start.0).abs() < CLICK_SLOP_PX && (y - self.start.1).abs() < CLICK_SLOP_PX
    }
}

fn touch_pair(e: &web_sys::TouchEvent) -> Option<(web_sys::Touch, web_sys::Touch)> {
    let touches = e.touches();
    if touches.length() != 2 {
        return None;
    }
    Some((touches.get(0)?, touches.get(1)?))
}

fn touch_distance(t0: &web_sys::Touch, t1: &web_sys::Touch) -> f64 {
    let dx = (t1.client_x() - t0.client_x()) as f64;
    let dy = (t1.client_y() - t0.client_y()) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// SVG choropleth. Drag pans, two-finger pinch zooms; wheel and double-click
/// are left to the page.
#[component]
pub fn UkMap() -> impl IntoView {
    let controller: MapController = expect_context();
    let Hovered(hovered) = expect_context();
    let MousePos(mouse_pos) = expect_context();
    let container = NodeRef::<Div>::new();
    let svg_ref = NodeRef::<Svg>::new();
    let gesture = StoredValue::new(Gesture::default());

    let quiet_ms = controller
        .config
        .with_value(|c| c.timings.resize_debounce_ms.max(0.0) as u64);
    let debounce = StoredValue::new(ResizeDebounce::new(quiet_ms));
    let pending_redraw = StoredValue::new_local(None::<Timeout>);

    // First draw once the container is in the document.
    Effect::new(move || {
        let Some(el) = container.get() else {
            return;
        };
        controller.redraw(el.client_width() as f64);
        if let Some(region) = controller.config.with_value(|c| c.current_region.clone())
            && !controller.select(&region)
        {
            tracing::warn!(region = %region, "initial region is not in the ranked set");
        }
    });

    // Debounced redraw on window resize. Scheduling a new timer drops, and so
    // cancels, the pending one.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        unbind_resize();

        let handler = Closure::<dyn Fn()>::new(move || {
            let Some(ticket) = debounce.try_update_value(|d| d.schedule(now_ms() as u64)) else {
                return;
            };
            let timeout = Timeout::new(quiet_ms as u32, move || {
                if debounce.try_update_value(|d| d.take(ticket)).unwrap_or(false) {
                    controller.redraw(measured_width(container));
                }
            });
            pending_redraw.set_value(Some(timeout));
        });
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            RESIZE_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(ResizeBinding {
                    window: window.clone(),
                    handler,
                });
            });
        }
        on_cleanup(unbind_resize);
    });

    let on_pointer_down = move |e: PointerEvent| {
        let at = (e.client_x() as f64, e.client_y() as f64);
        gesture.update_value(|g| {
            g.pointers += 1;
            if g.pointers == 1 {
                g.dragging = true;
                g.start = at;
                g.last = at;
            }
        });
        hovered.set(None);
    };

    let on_pointer_move = move |e: PointerEvent| {
        let at = (e.client_x() as f64, e.client_y() as f64);
        let g = gesture.get_value();
        if g.dragging && g.pointers == 1 {
            gesture.update_value(|g| g.last = at);
            controller.pan_by(at.0 - g.last.0, at.1 - g.last.1);
        } else if hovered.get_untracked().is_some() {
            mouse_pos.set(at);
        }
    };

    let on_pointer_up = move |_: PointerEvent| {
        gesture.update_value(|g| {
            g.pointers = g.pointers.saturating_sub(1);
            if g.pointers == 0 {
                g.dragging = false;
            }
        });
    };

    let on_pointer_leave = move |_: PointerEvent| {
        gesture.update_value(|g| {
            g.pointers = 0;
            g.dragging = false;
        });
        hovered.set(None);
    };

    let on_touch_start = move |e: web_sys::TouchEvent| {
        if let Some((t0, t1)) = touch_pair(&e) {
            e.prevent_default();
            gesture.update_value(|g| g.pinch_dist = touch_distance(&t0, &t1));
        }
    };

    let on_touch_move = move |e: web_sys::TouchEvent| {
        let Some((t0, t1)) = touch_pair(&e) else {
            return;
        };
        e.prevent_default();
        let new_dist = touch_distance(&t0, &t1);
        let old_dist = gesture.get_value().pinch_dist;
        gesture.update_value(|g| g.pinch_dist = new_dist);
        if old_dist <= 0.0 {
            return;
        }

        // Midpoint in the zoom layer's parent coordinates.
        let Some(svg) = svg_ref.get_untracked() else {
            return;
        };
        let rect = svg.get_bounding_client_rect();
        let (ox, oy) = controller.scene.with_untracked(|s| {
            let l = s.layout();
            (l.margin.left + l.frame_offset.0, l.margin.top + l.frame_offset.1)
        });
        let mid_x = (t0.client_x() + t1.client_x()) as f64 / 2.0 - rect.left() - ox;
        let mid_y = (t0.client_y() + t1.client_y()) as f64 / 2.0 - rect.top() - oy;
        controller.pinch(new_dist / old_dist, mid_x, mid_y);
    };

    let shape_keys = move || {
        controller.scene.with(|s| {
            s.shapes()
                .iter()
                .map(|sh| (s.epoch(), sh.name.clone()))
                .collect::<Vec<_>>()
        })
    };

    let marker = move || {
        let href = controller.selection.with(|s| s.icon().href.clone());
        controller.selection.with(|s| s.marker()).map(|m| {
            view! {
                <image
                    class="ukmap-marker"
                    href=href
                    x=m.x.to_string()
                    y=m.y.to_string()
                    width=m.width.to_string()
                    height=m.height.to_string()
                    style="pointer-events: none;"
                />
            }
        })
    };

    view! {
        <div node_ref=container class="ukmap-container" style="width: 100%; position: relative;">
            <svg
                node_ref=svg_ref
                class="ukmap-svg"
                width=move || controller.scene.with(|s| s.layout().width.to_string())
                height=move || controller.scene.with(|s| s.layout().height.to_string())
                style="display: block; touch-action: none; cursor: grab; user-select: none;"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointercancel=on_pointer_up
                on:pointerleave=on_pointer_leave
                on:touchstart=on_touch_start
                on:touchmove=on_touch_move
            >
                <g transform=move || controller.scene.with(|s| s.layout().frame_transform())>
                    <g transform=move || controller.viewport.with(|v| v.transform().to_svg())>
                        <For
                            each=shape_keys
                            key=|k: &(u64, String)| k.clone()
                            children=move |(_, name)| view! { <RegionPath name=name gesture=gesture /> }
                        />
                        {marker}
                    </g>
                </g>
            </svg>
        </div>
    }
}

#[component]
fn RegionPath(name: String, gesture: StoredValue<Gesture>) -> impl IntoView {
    let controller: MapController = expect_context();
    let Hovered(hovered) = expect_context();
    let MousePos(mouse_pos) = expect_context();

    let lookup = name.clone();
    let shape = Memo::new(move |_| {
        controller.scene.with(|s| {
            s.shape(&lookup)
                .map(|sh| (sh.path.clone(), sh.fill.to_hex(), sh.active))
        })
    });
    let path = move || shape.with(|s| s.as_ref().map(|s| s.0.clone()).unwrap_or_default());
    let fill = move || shape.with(|s| s.as_ref().map(|s| s.1.clone()).unwrap_or_default());
    let cursor = move || {
        if shape.with(|s| s.as_ref().is_some_and(|s| s.2)) {
            "pointer"
        } else {
            "inherit"
        }
    };

    let hover_name = name.clone();
    let on_enter = move |e: MouseEvent| {
        if gesture.with_value(|g| g.dragging) {
            return;
        }
        mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
        hovered.set(Some(hover_name.clone()));
    };
    let on_leave = move |_: MouseEvent| hovered.set(None);

    let click_name = name.clone();
    let on_click = move |e: MouseEvent| {
        let is_click =
            gesture.with_value(|g| g.is_click(e.client_x() as f64, e.client_y() as f64));
        if is_click {
            controller.handle_click(&click_name);
        }
    };

    view! {
        <path
            class="ukmap-region"
            data-name=name
            d=path
            fill=fill
            stroke=STROKE.to_hex()
            stroke-width="0.5"
            style:cursor=cursor
            on:mouseenter=on_enter
            on:mouseleave=on_leave
            on:click=on_click
        />
    }
}
