use thiserror::Error;

/// Startup data could not be fetched or parsed. Rendering must not proceed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing column `{0}`")]
    MissingColumn(String),
    #[error("row {row}: metric `{value}` is neither a number nor the unavailable sentinel")]
    InvalidMetric { row: usize, value: String },
    #[error("geometry parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("geometry parse error: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("topology has no object named `{0}`")]
    MissingObject(String),
    #[error("unsupported geometry document: {0}")]
    UnsupportedGeometry(String),
    #[error("arc index {0} is out of range")]
    ArcOutOfRange(i64),
    #[error("{0} source contained no usable entries")]
    Empty(&'static str),
}

/// Construction options were rejected before anything was rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("a container element id is required")]
    MissingContainer,
    #[error("height must be positive, got {0}")]
    InvalidHeight(f64),
    #[error("initial scale must be positive, got {0}")]
    InvalidScale(f64),
    #[error("zoom range [{min}, {max}] is empty or non-positive")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("zoom step must be positive, got {0}")]
    InvalidZoomStep(f64),
    #[error("vertical margins ({0}) leave no room for the chart")]
    MarginsExceedViewport(f64),
    #[error("configuration is not valid JSON: {0}")]
    Malformed(String),
}
