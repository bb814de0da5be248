use std::collections::HashMap;

use leptos::prelude::*;
use ukmap_shared::tooltip::{TooltipHost, TooltipRegistry};
use ukmap_shared::{
    ChoroplethModel, DatasetConfig, MapConfig, MapHooks, MapLayout, MapScene,
    SelectionController, ViewportController,
};

use crate::render_loop::FrameLoop;

pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub(crate) fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(1024.0)
}

/// Tooltip contents live in a signal keyed by region name; the hover layer
/// reads from it.
#[derive(Clone, Copy)]
pub(crate) struct SignalTooltipHost {
    contents: RwSignal<HashMap<String, String>>,
}

impl TooltipHost for SignalTooltipHost {
    type Handle = String;

    fn create(&mut self, name: &str, html: &str) -> String {
        self.contents
            .update(|c| drop(c.insert(name.to_string(), html.to_string())));
        name.to_string()
    }

    fn set_content(&mut self, handle: &mut String, html: &str) {
        self.contents.update(|c| {
            if let Some(slot) = c.get_mut(handle.as_str()) {
                *slot = html.to_string();
            }
        });
    }

    fn destroy(&mut self, handle: String) {
        self.contents.update(|c| drop(c.remove(&handle)));
    }
}

/// Owns the map's mutable state and the operations that change it.
#[derive(Clone, Copy)]
pub(crate) struct MapController {
    pub config: StoredValue<MapConfig>,
    pub dataset: StoredValue<DatasetConfig>,
    pub model: RwSignal<Option<ChoroplethModel>>,
    pub scene: RwSignal<MapScene>,
    pub viewport: RwSignal<ViewportController>,
    pub selection: RwSignal<SelectionController>,
    pub tooltip_contents: RwSignal<HashMap<String, String>>,
    tooltips: StoredValue<TooltipRegistry<SignalTooltipHost>>,
    hooks: StoredValue<MapHooks, LocalStorage>,
    frames: StoredValue<Option<FrameLoop>, LocalStorage>,
}

impl MapController {
    pub fn new(config: MapConfig, dataset: DatasetConfig) -> Self {
        let layout = MapLayout::measure(&config, 0.0, viewport_width(), None);
        let viewport =
            ViewportController::new(config.zoom, config.timings, config.initial_scale);
        let selection = SelectionController::new(config.marker.clone());
        Self {
            config: StoredValue::new(config),
            dataset: StoredValue::new(dataset),
            model: RwSignal::new(None),
            scene: RwSignal::new(MapScene::new(layout)),
            viewport: RwSignal::new(viewport),
            selection: RwSignal::new(selection),
            tooltip_contents: RwSignal::new(HashMap::new()),
            tooltips: StoredValue::new(TooltipRegistry::new()),
            hooks: StoredValue::new_local(MapHooks::default()),
            frames: StoredValue::new_local(None),
        }
    }

    pub fn set_hooks(&self, hooks: MapHooks) {
        self.hooks.set_value(hooks);
    }

    pub fn hooks(&self) -> MapHooks {
        self.hooks.get_value()
    }

    fn tooltip_host(&self) -> SignalTooltipHost {
        SignalTooltipHost {
            contents: self.tooltip_contents,
        }
    }

    /// Full redraw for the given container width: refit, rebuild every
    /// shape, recreate tooltips, move the marker to the new projection.
    pub fn redraw(&self, container_width: f64) {
        let hooks = self.hooks();
        let config = self.config.get_value();
        let previous = self.scene.with_untracked(|s| s.layout().width);
        let layout = MapLayout::measure(
            &config,
            container_width,
            viewport_width(),
            Some(previous),
        );

        let drawn = self.model.with_untracked(|model| {
            let model = model.as_ref()?;
            self.scene.update(|scene| {
                scene.rebuild(layout, model.geometry.regions(), |name| {
                    model.shape_style(name, &hooks)
                });
            });
            Some(model.geometry.len())
        });
        let Some(shapes) = drawn else {
            tracing::debug!("redraw skipped before data load");
            return;
        };

        self.viewport
            .update(|v| v.set_viewport_size(layout.chart_width(), layout.chart_height()));

        let mut host = self.tooltip_host();
        let names: Vec<String> = self
            .scene
            .with_untracked(|s| s.shapes().iter().map(|sh| sh.name.clone()).collect());
        self.tooltips.update_value(|registry| {
            registry.refresh(&mut host, names.iter().map(String::as_str), |name| {
                hooks.tooltip_html(name)
            });
        });

        self.scene.with_untracked(|scene| {
            self.selection.update(|sel| sel.rehighlight(scene));
        });
        tracing::debug!(shapes, width = layout.width, height = layout.height, "map redrawn");
    }

    /// Re-query tooltip contents for the tooltips that already exist.
    pub fn update_tooltips(&self) {
        let hooks = self.hooks();
        let mut host = self.tooltip_host();
        self.tooltips.update_value(|registry| {
            registry.update_contents(&mut host, |name| hooks.tooltip_html(name));
        });
    }

    /// Highlight `name`. Unknown or inactive names are ignored.
    pub fn select(&self, name: &str) -> bool {
        let selected = self.model.with_untracked(|model| {
            let Some(model) = model.as_ref() else {
                return false;
            };
            self.scene.with_untracked(|scene| {
                let mut changed = false;
                self.selection
                    .update(|sel| changed = sel.select(name, model, scene));
                changed
            })
        });
        if selected {
            tracing::debug!(name, "region selected");
            self.update_tooltips();
        }
        selected
    }

    pub fn current_region(&self) -> Option<String> {
        self.selection.with(|s| s.current().map(str::to_string))
    }

    /// Route a click on a drawn shape. Inactive shapes are ignored.
    pub fn handle_click(&self, name: &str) {
        let clickable = self
            .scene
            .with_untracked(|s| s.click_target(name).is_some());
        if clickable {
            self.hooks().feature_clicked(name);
        } else {
            tracing::debug!(name, "click on inactive region ignored");
        }
    }

    fn animate(&self) {
        let viewport = self.viewport;
        self.frames.update_value(|frames| {
            let frames = frames.get_or_insert_with(|| {
                FrameLoop::new(move |now| viewport.try_update(|v| v.tick(now)).unwrap_or(false))
            });
            frames.start();
        });
    }

    pub fn zoom_to(&self, scale: f64) {
        let now = now_ms();
        self.viewport.update(|v| {
            v.zoom_to(scale, now);
        });
        self.animate();
    }

    pub fn zoom_in(&self) {
        let now = now_ms();
        self.viewport.update(|v| {
            v.zoom_in(now);
        });
        self.animate();
    }

    pub fn zoom_out(&self) {
        let now = now_ms();
        self.viewport.update(|v| {
            v.zoom_out(now);
        });
        self.animate();
    }

    pub fn reset_zoom(&self) {
        let now = now_ms();
        self.viewport.update(|v| v.reset_zoom(now));
        self.animate();
    }

    pub fn pan_by(&self, dx: f64, dy: f64) {
        self.viewport.update(|v| v.pan_by(dx, dy));
    }

    pub fn pinch(&self, factor: f64, cx: f64, cy: f64) {
        self.viewport.update(|v| {
            v.pinch(factor, cx, cy);
        });
    }
}
