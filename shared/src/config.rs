use serde::{Deserialize, Serialize};

use crate::dataset::DatasetColumns;
use crate::error::ConfigError;

pub const DEFAULT_DATASET_URL: &str = "./data/UK.csv";
pub const DEFAULT_GEOMETRY_URL: &str = "./data/map.json";
pub const DEFAULT_TOPOLOGY_OBJECT: &str = "collection";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Margin {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            left: v,
            right: v,
            bottom: v,
        }
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(15.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_scale: 0.4,
            max_scale: 4.0,
            step: 0.2,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Picks the map height from the viewport width instead of sniffing the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsivePolicy {
    pub mobile_breakpoint: f64,
    pub mobile_height: f64,
    pub desktop_height: f64,
}

impl Default for ResponsivePolicy {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            mobile_height: 530.0,
            desktop_height: 585.0,
        }
    }
}

impl ResponsivePolicy {
    pub fn is_mobile(&self, viewport_width: f64) -> bool {
        viewport_width <= self.mobile_breakpoint
    }

    pub fn height_for(&self, viewport_width: f64) -> f64 {
        if self.is_mobile(viewport_width) {
            self.mobile_height
        } else {
            self.desktop_height
        }
    }
}

/// Durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTimings {
    pub zoom_ms: f64,
    pub reset_ms: f64,
    pub resize_debounce_ms: f64,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            zoom_ms: 300.0,
            reset_ms: 1000.0,
            resize_debounce_ms: 100.0,
        }
    }
}

/// Selection marker image. The offsets put the pin tip on the anchor point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerIcon {
    pub href: String,
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            href: "./images/marker.svg".to_string(),
            width: 30.0,
            height: 30.0,
            offset_x: -10.0,
            offset_y: -30.0,
        }
    }
}

/// Immutable map options, checked once by [`MapConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Id of the element the map mounts into.
    pub container: String,
    /// Explicit height; `None` defers to the responsive policy.
    pub height: Option<f64>,
    pub margin: Margin,
    pub initial_scale: f64,
    pub inactive_features: Vec<String>,
    pub current_region: Option<String>,
    pub zoom: ZoomLimits,
    pub responsive: ResponsivePolicy,
    pub timings: TransitionTimings,
    pub marker: MarkerIcon,
    pub log_level: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container: String::new(),
            height: None,
            margin: Margin::default(),
            initial_scale: 1.0,
            inactive_features: Vec::new(),
            current_region: None,
            zoom: ZoomLimits::default(),
            responsive: ResponsivePolicy::default(),
            timings: TransitionTimings::default(),
            marker: MarkerIcon::default(),
            log_level: "info".to_string(),
        }
    }
}

impl MapConfig {
    pub fn builder() -> MapConfigBuilder {
        MapConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.trim().is_empty() {
            return Err(ConfigError::MissingContainer);
        }
        let heights = [
            self.height.unwrap_or(self.responsive.desktop_height),
            self.responsive.mobile_height,
        ];
        for h in heights {
            if !(h.is_finite() && h > 0.0) {
                return Err(ConfigError::InvalidHeight(h));
            }
        }
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.initial_scale));
        }
        let ZoomLimits {
            min_scale,
            max_scale,
            step,
        } = self.zoom;
        if !(min_scale > 0.0 && min_scale <= max_scale && max_scale.is_finite()) {
            return Err(ConfigError::InvalidZoomRange {
                min: min_scale,
                max: max_scale,
            });
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::InvalidZoomStep(step));
        }
        let vertical = self.margin.top + self.margin.bottom;
        if heights.iter().any(|h| vertical >= *h) {
            return Err(ConfigError::MarginsExceedViewport(vertical));
        }
        Ok(())
    }

    /// Height for the given viewport width.
    pub fn height_for(&self, viewport_width: f64) -> f64 {
        self.height
            .unwrap_or_else(|| self.responsive.height_for(viewport_width))
    }

    /// Fixed offset applied to the outer frame when starting zoomed in.
    pub fn frame_offset(&self) -> (f64, f64) {
        if self.initial_scale > 1.0 {
            (-35.0, -105.0)
        } else {
            (0.0, 0.0)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapConfigBuilder {
    config: MapConfig,
}

impl MapConfigBuilder {
    pub fn container(mut self, id: impl Into<String>) -> Self {
        self.config.container = id.into();
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.config.height = Some(height);
        self
    }

    pub fn margin(mut self, margin: Margin) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn initial_scale(mut self, scale: f64) -> Self {
        self.config.initial_scale = scale;
        self
    }

    pub fn inactive_features(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.config.inactive_features = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn current_region(mut self, name: impl Into<String>) -> Self {
        self.config.current_region = Some(name.into());
        self
    }

    pub fn zoom(mut self, zoom: ZoomLimits) -> Self {
        self.config.zoom = zoom;
        self
    }

    pub fn responsive(mut self, policy: ResponsivePolicy) -> Self {
        self.config.responsive = policy;
        self
    }

    pub fn timings(mut self, timings: TransitionTimings) -> Self {
        self.config.timings = timings;
        self
    }

    pub fn marker(mut self, marker: MarkerIcon) -> Self {
        self.config.marker = marker;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn build(self) -> Result<MapConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Where the two startup sources live and how to read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub dataset_url: String,
    pub geometry_url: String,
    pub topology_object: String,
    pub columns: DatasetColumns,
    /// Columns shown in the detail panel, in order.
    pub detail_columns: Vec<String>,
    /// Geometry features that are never colored or clickable.
    pub always_inactive: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            geometry_url: DEFAULT_GEOMETRY_URL.to_string(),
            topology_object: DEFAULT_TOPOLOGY_OBJECT.to_string(),
            columns: DatasetColumns::default(),
            detail_columns: vec![
                "Sweet Dish 1".to_string(),
                "Sweet Dish 2".to_string(),
                "Sweet Dish 3".to_string(),
            ],
            always_inactive: vec!["Ireland".to_string()],
        }
    }
}
