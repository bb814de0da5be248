use crate::config::MarkerIcon;
use crate::model::ChoroplethModel;
use crate::scene::MapScene;

/// Top-left corner and size of the marker image, in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Tracks the highlighted region and where its marker sits.
#[derive(Debug, Clone)]
pub struct SelectionController {
    icon: MarkerIcon,
    current: Option<String>,
    marker: Option<MarkerPlacement>,
}

impl SelectionController {
    pub fn new(icon: MarkerIcon) -> Self {
        Self {
            icon,
            current: None,
            marker: None,
        }
    }

    pub fn icon(&self) -> &MarkerIcon {
        &self.icon
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn marker(&self) -> Option<MarkerPlacement> {
        self.marker
    }

    /// Highlight `name`. Inactive or unranked names leave everything as it
    /// was and return `false`.
    pub fn select(&mut self, name: &str, model: &ChoroplethModel, scene: &MapScene) -> bool {
        if !model.is_active(name) {
            tracing::debug!(name, "selection ignored for inactive region");
            return false;
        }
        self.current = Some(name.to_string());
        self.place_marker(scene);
        true
    }

    /// Recompute the marker for the current region, e.g. after a rebuild
    /// changed the projection.
    pub fn rehighlight(&mut self, scene: &MapScene) {
        self.place_marker(scene);
    }

    fn place_marker(&mut self, scene: &MapScene) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        match scene.centroid(name) {
            Some((cx, cy)) => {
                self.marker = Some(MarkerPlacement {
                    x: cx + self.icon.offset_x,
                    y: cy + self.icon.offset_y,
                    width: self.icon.width,
                    height: self.icon.height,
                });
            }
            // No shape drawn yet; the marker stays put until the next rebuild.
            None => tracing::debug!(name, "no shape to anchor marker"),
        }
    }
}
