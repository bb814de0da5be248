mod app;
mod controller;
mod fetch;
mod logging;
mod map;
mod render_loop;
mod sidebar;
mod tooltip;

use leptos::mount::mount_to;
use leptos::prelude::*;
use serde::Deserialize;
use std::any::Any;
use std::cell::RefCell;
use ukmap_shared::{ConfigError, DatasetConfig, MapConfig};
use wasm_bindgen::JsCast;

use crate::app::{App, ErrorPanel};

/// Id of the optional inline JSON block that overrides the defaults.
const CONFIG_ELEMENT_ID: &str = "ukmap-config";

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PageConfig {
    map: MapConfig,
    dataset: DatasetConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            map: MapConfig {
                container: "map".to_string(),
                current_region: Some("N".to_string()),
                ..MapConfig::default()
            },
            dataset: DatasetConfig::default(),
        }
    }
}

/// Page configuration: defaults, or the inline JSON block when present.
/// A block that does not parse is rejected rather than ignored.
fn page_config(document: &web_sys::Document) -> Result<PageConfig, ConfigError> {
    let Some(text) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return Ok(PageConfig::default());
    };
    parse_page_config(&text)
}

fn parse_page_config(text: &str) -> Result<PageConfig, ConfigError> {
    serde_json::from_str(text).map_err(|err| ConfigError::Malformed(err.to_string()))
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let parsed = page_config(&document);
    let log_level = parsed
        .as_ref()
        .map(|c| c.map.log_level.clone())
        .unwrap_or_else(|_| MapConfig::default().log_level);
    logging::init(&log_level);

    let (map, dataset) = match parsed {
        Ok(PageConfig { map, dataset }) => (map, dataset),
        Err(err) => {
            // Without a parsed config the container id is unknown; fall back to
            // the default one, then the body.
            let target = document
                .get_element_by_id(&PageConfig::default().map.container)
                .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok());
            mount_error(&document, target, err);
            return;
        }
    };

    let mount_target = document
        .get_element_by_id(&map.container)
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok());

    if let Err(err) = map.validate() {
        mount_error(&document, mount_target, err);
        return;
    }
    let Some(target) = mount_target else {
        tracing::error!(container = %map.container, "map container element not found");
        return;
    };

    tracing::info!(container = %map.container, "mounting map");
    APP_MOUNT_HANDLE.with(move |slot| {
        // A re-entered main() must not leave the old mount mutating state.
        let _old = slot.borrow_mut().take();
        let handle: Box<dyn Any> =
            Box::new(mount_to(target, move || view! { <App config=map dataset=dataset /> }));
        *slot.borrow_mut() = Some(handle);
    });
}

/// Log the rejection and show it in place of the map.
fn mount_error(
    document: &web_sys::Document,
    target: Option<web_sys::HtmlElement>,
    err: ConfigError,
) {
    tracing::error!(error = %err, "map configuration rejected");
    let Some(target) = target.or_else(|| document.body()) else {
        return;
    };
    let message = err.to_string();
    APP_MOUNT_HANDLE.with(move |slot| {
        let _old = slot.borrow_mut().take();
        let handle: Box<dyn Any> =
            Box::new(mount_to(target, move || view! { <ErrorPanel message=message /> }));
        *slot.borrow_mut() = Some(handle);
    });
}
