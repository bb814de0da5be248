use leptos::prelude::*;
use ukmap_shared::format::ordinal;
use ukmap_shared::ranking::Choice;

use crate::controller::MapController;

fn matches_query(choice: &Choice, query: &str) -> bool {
    query.is_empty()
        || choice.label.to_lowercase().contains(query)
        || choice.value.to_lowercase().contains(query)
}

/// Zoom out / slider / zoom in / reset. The slider mirrors the view scale,
/// including scale changes made by pinch gestures.
#[component]
pub fn ZoomControls() -> impl IntoView {
    let controller: MapController = expect_context();
    let limits = controller.viewport.with_untracked(|v| v.limits());
    let scale = Memo::new(move |_| controller.viewport.with(|v| v.current_scale()));

    let on_slider = move |e: leptos::ev::Event| {
        if let Ok(value) = event_target_value(&e).parse::<f64>() {
            controller.zoom_to(value);
        }
    };

    let button_style = "width: 30px; height: 30px; border: 1px solid #d7d7d7; border-radius: 4px; background: #ffffff; cursor: pointer; font-size: 1rem; line-height: 1;";

    view! {
        <div class="ukmap-zoom" style="display: flex; align-items: center; gap: 8px; padding: 8px 0;">
            <button
                class="ukmap-zoom-out"
                title="Zoom out"
                style=button_style
                on:click=move |_| controller.zoom_out()
            >
                "\u{2212}"
            </button>
            <input
                class="ukmap-zoom-slider"
                type="range"
                min=limits.min_scale.to_string()
                max=limits.max_scale.to_string()
                step=limits.step.to_string()
                prop:value=move || scale.get().to_string()
                on:input=on_slider
                style="flex: 1;"
            />
            <button
                class="ukmap-zoom-in"
                title="Zoom in"
                style=button_style
                on:click=move |_| controller.zoom_in()
            >
                "+"
            </button>
            <button
                class="ukmap-zoom-reset"
                title="Reset zoom"
                style="height: 30px; padding: 0 10px; border: 1px solid #d7d7d7; border-radius: 4px; background: #ffffff; cursor: pointer; font-size: 0.8rem;"
                on:click=move |_| controller.reset_zoom()
            >
                "Reset"
            </button>
        </div>
    }
}

/// Searchable list of ranked regions, sorted by label.
#[component]
pub fn RegionSelector() -> impl IntoView {
    let controller: MapController = expect_context();
    let query = RwSignal::new(String::new());

    let choices = Memo::new(move |_| {
        controller
            .model
            .with(|m| m.as_ref().map(|m| m.index.choices()).unwrap_or_default())
    });
    let filtered = Memo::new(move |_| {
        let q = query.get().trim().to_lowercase();
        choices.with(|all| {
            all.iter()
                .filter(|c| matches_query(c, &q))
                .cloned()
                .collect::<Vec<_>>()
        })
    });
    let current = Memo::new(move |_| controller.current_region());

    view! {
        <div class="ukmap-selector" style="display: flex; flex-direction: column; gap: 6px;">
            <input
                class="ukmap-search"
                type="text"
                placeholder="Search regions or postcodes..."
                prop:value=move || query.get()
                on:input=move |e| query.set(event_target_value(&e))
                style="padding: 8px 10px; border: 1px solid #d7d7d7; border-radius: 4px; font-size: 0.9rem;"
            />
            <div style="max-height: 240px; overflow-y: auto; border: 1px solid #eeeeee; border-radius: 4px;">
                <For
                    each=move || filtered.get()
                    key=|c: &Choice| c.value.clone()
                    children=move |choice| {
                        let value = choice.value.clone();
                        let is_current = {
                            let value = value.clone();
                            move || current.with(|c| c.as_deref() == Some(value.as_str()))
                        };
                        view! {
                            <div
                                class="ukmap-choice"
                                class:selected=is_current.clone()
                                style="padding: 6px 10px; cursor: pointer; display: flex; justify-content: space-between; gap: 8px;"
                                style:background=move || if is_current() { "#ffead4" } else { "transparent" }
                                on:click=move |_| {
                                    controller.select(&value);
                                }
                            >
                                <span>{choice.label}</span>
                                <span style="color: #888; font-family: monospace;">{choice.value}</span>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

/// Label, rank, and the configured display columns of the current region.
#[component]
pub fn DetailPanel() -> impl IntoView {
    let controller: MapController = expect_context();
    let detail_columns = controller.dataset.with_value(|d| d.detail_columns.clone());

    let detail = Memo::new(move |_| {
        let name = controller.current_region()?;
        controller.model.with(|m| {
            let model = m.as_ref()?;
            let record = model.index.get(&name)?;
            let fields: Vec<(String, String)> = detail_columns
                .iter()
                .map(|col| (col.clone(), record.field(col).unwrap_or("").to_string()))
                .collect();
            Some((record.region.clone(), record.rank.map(ordinal), fields))
        })
    });

    view! {
        {move || match detail.get() {
            None => view! { <div class="ukmap-detail ukmap-detail-empty" /> }.into_any(),
            Some((region, rank, fields)) => {
                view! {
                    <div class="ukmap-detail" style="padding: 10px 0; font-family: system-ui, sans-serif;">
                        <div style="font-size: 1.1rem; font-weight: 700;">{region}</div>
                        {rank.map(|r| view! {
                            <div style="color: #ff8000; font-weight: 600; margin-top: 2px;">{r}</div>
                        })}
                        <ol style="margin: 8px 0 0; padding-left: 20px;">
                            {fields
                                .into_iter()
                                .filter(|(_, v)| !v.is_empty())
                                .map(|(col, v)| view! { <li title=col>{v}</li> })
                                .collect_view()}
                        </ol>
                    </div>
                }
                    .into_any()
            }
        }}
    }
}
