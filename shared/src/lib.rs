pub mod colors;
pub mod config;
pub mod dataset;
pub mod debounce;
pub mod error;
pub mod format;
pub mod geometry;
pub mod hooks;
pub mod model;
pub mod projection;
pub mod ranking;
pub mod scene;
pub mod selection;
pub mod tooltip;
pub mod viewport;

pub use colors::{ColorMapper, NEUTRAL, RANK_PALETTE, Rgb};
pub use config::{DatasetConfig, MapConfig, MapConfigBuilder};
pub use dataset::{DatasetColumns, Metric, MetricRecord};
pub use error::{ConfigError, LoadError};
pub use geometry::{GeometryStore, Region};
pub use hooks::MapHooks;
pub use model::ChoroplethModel;
pub use ranking::{Choice, DatasetIndex, InactiveSet, Ranking, rank};
pub use scene::{JoinReport, MapLayout, MapScene, Shape, ShapeStyle};
pub use selection::{MarkerPlacement, SelectionController};
pub use tooltip::{TooltipHost, TooltipRegistry};
pub use viewport::{ViewTransform, ViewportController};
