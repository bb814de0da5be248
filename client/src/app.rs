use leptos::prelude::*;
use ukmap_shared::format::ordinal;
use ukmap_shared::{ChoroplethModel, DatasetConfig, MapConfig, MapHooks, NEUTRAL};

use crate::controller::MapController;
use crate::fetch;
use crate::map::UkMap;
use crate::sidebar::{DetailPanel, RegionSelector, ZoomControls};
use crate::tooltip::{HoverTooltip, escape_html};

/// Newtype wrappers so the two position/name signals get distinct context types.
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct MousePos(pub RwSignal<(f64, f64)>);

#[derive(Clone, Debug, PartialEq)]
enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

fn tooltip_html(controller: MapController, name: &str) -> Option<String> {
    let current = controller.selection.with_untracked(|s| s.current() == Some(name));
    controller
        .model
        .with_untracked(|model| tooltip_content(model.as_ref()?, name, current))
}

/// Tooltip markup for an active region; inactive regions get none.
fn tooltip_content(model: &ChoroplethModel, name: &str, current: bool) -> Option<String> {
    if !model.is_active(name) {
        return None;
    }
    let record = model.index.get(name)?;
    let rank = record.rank?;
    let mut html = format!(
        "<strong>{}</strong><br/>{} of {}",
        escape_html(&record.region),
        ordinal(rank),
        model.index.len()
    );
    if current {
        html.push_str("<br/><em>Selected</em>");
    }
    Some(html)
}

#[component]
pub fn App(config: MapConfig, dataset: DatasetConfig) -> impl IntoView {
    let inactive = config.inactive_features.clone();
    let controller = MapController::new(config, dataset.clone());
    let hovered = RwSignal::new(None::<String>);
    let mouse_pos = RwSignal::new((0.0, 0.0));
    let load_state = RwSignal::new(LoadState::Loading);

    controller.set_hooks(
        MapHooks::default()
            .with_tooltip_html(move |name| tooltip_html(controller, name))
            .with_feature_click(move |name| {
                controller.select(name);
            })
            .with_color(move |name| {
                controller
                    .model
                    .with_untracked(|m| m.as_ref().map(|m| m.color_for(name)))
                    .unwrap_or(NEUTRAL)
            }),
    );

    provide_context(controller);
    provide_context(Hovered(hovered));
    provide_context(MousePos(mouse_pos));

    // Both sources must arrive before anything is drawn.
    Effect::new(move || {
        let dataset = dataset.clone();
        let inactive = inactive.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match fetch::load_sources(&dataset, &inactive).await {
                Ok(model) => {
                    controller.model.set(Some(model));
                    load_state.set(LoadState::Ready);
                }
                Err(err) => {
                    tracing::error!(error = %err, "map data failed to load");
                    load_state.set(LoadState::Failed(err.to_string()));
                }
            }
        });
    });

    view! {
        <div class="ukmap">
            {move || match load_state.get() {
                LoadState::Loading => {
                    view! { <div class="ukmap-status">"Loading map\u{2026}"</div> }.into_any()
                }
                LoadState::Failed(message) => view! { <ErrorPanel message=message /> }.into_any(),
                LoadState::Ready => {
                    view! {
                        <div class="ukmap-layout">
                            <UkMap />
                            <aside class="ukmap-panel">
                                <ZoomControls />
                                <RegionSelector />
                                <DetailPanel />
                            </aside>
                        </div>
                    }
                        .into_any()
                }
            }}
            <HoverTooltip />
        </div>
    }
}

/// Shown instead of the map when startup fails.
#[component]
pub fn ErrorPanel(message: String) -> impl IntoView {
    view! {
        <div
            class="ukmap-error"
            role="alert"
            style="padding: 16px 20px; border: 1px solid #e0a0a0; border-radius: 6px; background: #fff5f5; color: #8a1f1f; font-family: system-ui, sans-serif; font-size: 0.9rem;"
        >
            <strong>"The map could not be displayed."</strong>
            <div style="margin-top: 6px; font-family: monospace; font-size: 0.8rem;">{message}</div>
        </div>
    }
}
