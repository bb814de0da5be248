use std::collections::{HashMap, HashSet};

use geo::{Centroid, MultiPolygon};

use crate::colors::Rgb;
use crate::config::{MapConfig, Margin};
use crate::geometry::{Region, extent_of};
use crate::projection::{Mercator, svg_path};

/// Pixel dimensions of the map and its chart area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Static offset of the outer frame, see [`MapConfig::frame_offset`].
    pub frame_offset: (f64, f64),
}

impl MapLayout {
    /// Measure from the container width. A container reporting zero width
    /// (detached or hidden) keeps `previous_width`.
    pub fn measure(
        config: &MapConfig,
        container_width: f64,
        viewport_width: f64,
        previous_width: Option<f64>,
    ) -> Self {
        let width = if container_width > 0.0 {
            container_width
        } else {
            previous_width.unwrap_or(0.0)
        };
        Self {
            width,
            height: config.height_for(viewport_width),
            margin: config.margin,
            frame_offset: config.frame_offset(),
        }
    }

    pub fn chart_width(&self) -> f64 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn chart_height(&self) -> f64 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }

    /// Transform for the outer frame holding the zoomable layer.
    pub fn frame_transform(&self) -> String {
        format!(
            "translate({},{})",
            self.margin.left + self.frame_offset.0,
            self.margin.top + self.frame_offset.1
        )
    }
}

/// How one region is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub fill: Rgb,
    pub active: bool,
}

/// A drawn region in chart coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub path: String,
    pub fill: Rgb,
    pub active: bool,
    pub projected: MultiPolygon<f64>,
}

impl Shape {
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.projected.centroid().map(|p| (p.x(), p.y()))
    }
}

/// Names touched by one data join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReport {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

/// Shapes keyed by region name under a projection fitted to the layout.
#[derive(Debug, Clone)]
pub struct MapScene {
    layout: MapLayout,
    projection: Mercator,
    shapes: Vec<Shape>,
    by_name: HashMap<String, usize>,
    epoch: u64,
}

impl MapScene {
    pub fn new(layout: MapLayout) -> Self {
        Self {
            layout,
            projection: Mercator::default(),
            shapes: Vec::new(),
            by_name: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    pub fn projection(&self) -> Mercator {
        self.projection
    }

    /// Bumped on every full rebuild.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.by_name.get(name).map(|&i| &self.shapes[i])
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shape a click on `name` should act on. Inactive shapes ignore clicks.
    pub fn click_target(&self, name: &str) -> Option<&Shape> {
        self.shape(name).filter(|s| s.active)
    }

    pub fn centroid(&self, name: &str) -> Option<(f64, f64)> {
        self.shape(name).and_then(Shape::centroid)
    }

    /// Full redraw: refit the projection to `layout`, drop every shape and
    /// draw `regions` from scratch.
    pub fn rebuild(
        &mut self,
        layout: MapLayout,
        regions: &[Region],
        style: impl Fn(&str) -> ShapeStyle,
    ) -> JoinReport {
        self.layout = layout;
        if let Some(extent) = extent_of(regions) {
            self.projection =
                Mercator::fit_size(layout.chart_width(), layout.chart_height(), extent);
        }
        self.shapes.clear();
        self.by_name.clear();
        self.epoch += 1;
        tracing::debug!(
            epoch = self.epoch,
            width = layout.width,
            height = layout.height,
            "rebuilding map"
        );
        self.render(regions, style)
    }

    /// Keyed join of `regions` against the current shapes under the current
    /// projection: new names enter, known names update in place, missing
    /// names exit.
    pub fn render(
        &mut self,
        regions: &[Region],
        style: impl Fn(&str) -> ShapeStyle,
    ) -> JoinReport {
        let mut previous: HashMap<String, Shape> = self
            .shapes
            .drain(..)
            .map(|s| (s.name.clone(), s))
            .collect();
        let mut seen = HashSet::with_capacity(regions.len());
        let mut report = JoinReport::default();

        for region in regions {
            if !seen.insert(region.name.as_str()) {
                tracing::debug!(name = %region.name, "duplicate region name skipped");
                continue;
            }
            let projected = self.projection.project_multipolygon(&region.boundary);
            let path = svg_path(&projected);
            let ShapeStyle { fill, active } = style(&region.name);

            let shape = match previous.remove(&region.name) {
                Some(mut shape) => {
                    shape.path = path;
                    shape.fill = fill;
                    shape.active = active;
                    shape.projected = projected;
                    report.updated.push(region.name.clone());
                    shape
                }
                None => {
                    report.entered.push(region.name.clone());
                    Shape {
                        name: region.name.clone(),
                        path,
                        fill,
                        active,
                        projected,
                    }
                }
            };
            self.shapes.push(shape);
        }

        report.exited = previous.into_keys().collect();
        report.exited.sort();
        self.by_name = self
            .shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{NEUTRAL, RANK_PALETTE};
    use crate::geometry::GeometryStore;
    use crate::geometry::fixtures::TOPOLOGY;

    fn config() -> MapConfig {
        MapConfig::builder().container("map").build().expect("valid")
    }

    fn layout(width: f64) -> MapLayout {
        MapLayout::measure(&config(), width, 1024.0, None)
    }

    fn style(name: &str) -> ShapeStyle {
        ShapeStyle {
            fill: if name == "W" { RANK_PALETTE[0] } else { NEUTRAL },
            active: name == "W",
        }
    }

    fn store() -> GeometryStore {
        GeometryStore::parse(TOPOLOGY, "collection").expect("parse")
    }

    #[test]
    fn layout_uses_container_width_and_responsive_height() {
        let l = layout(800.0);
        assert_eq!((l.width, l.height), (800.0, 585.0));
        assert_eq!(l.chart_width(), 770.0);
        assert_eq!(l.chart_height(), 555.0);
        assert_eq!(l.frame_transform(), "translate(15,15)");

        let mobile = MapLayout::measure(&config(), 360.0, 360.0, None);
        assert_eq!(mobile.height, 530.0);
    }

    #[test]
    fn zero_width_container_keeps_previous_width() {
        let l = MapLayout::measure(&config(), 0.0, 1024.0, Some(640.0));
        assert_eq!(l.width, 640.0);
    }

    #[test]
    fn frame_offset_shifts_outer_frame() {
        let zoomed = MapConfig::builder()
            .container("map")
            .initial_scale(2.0)
            .build()
            .expect("valid");
        let l = MapLayout::measure(&zoomed, 800.0, 1024.0, None);
        assert_eq!(l.frame_transform(), "translate(-20,-90)");
    }

    #[test]
    fn rebuild_draws_every_region_inside_chart_area() {
        let store = store();
        let mut scene = MapScene::new(layout(800.0));
        let report = scene.rebuild(layout(800.0), store.regions(), style);

        assert_eq!(report.entered, vec!["W".to_string(), "E".to_string()]);
        assert_eq!(scene.epoch(), 1);
        assert_eq!(scene.len(), 2);
        for shape in scene.shapes() {
            assert!(shape.path.starts_with('M') && shape.path.ends_with('Z'));
            let (x, y) = shape.centroid().expect("centroid");
            assert!((0.0..=770.0).contains(&x), "x = {x}");
            assert!((0.0..=555.0).contains(&y), "y = {y}");
        }
        let west = scene.centroid("W").expect("west");
        let east = scene.centroid("E").expect("east");
        assert!(west.0 < east.0);
    }

    #[test]
    fn render_joins_by_name() {
        let store = store();
        let mut scene = MapScene::new(layout(800.0));
        scene.rebuild(layout(800.0), &store.regions()[..1], style);

        let report = scene.render(&store.regions()[1..], style);
        assert_eq!(report.entered, vec!["E".to_string()]);
        assert!(report.updated.is_empty());
        assert_eq!(report.exited, vec!["W".to_string()]);
        assert!(scene.shape("W").is_none());

        let report = scene.render(store.regions(), style);
        assert_eq!(report.entered, vec!["W".to_string()]);
        assert_eq!(report.updated, vec!["E".to_string()]);
        assert_eq!(scene.epoch(), 1);
    }

    #[test]
    fn resize_rebuild_refits_projection() {
        let store = store();
        let mut scene = MapScene::new(layout(800.0));
        scene.rebuild(layout(800.0), store.regions(), style);
        let wide = scene.centroid("E").expect("centroid");

        scene.rebuild(layout(400.0), store.regions(), style);
        let narrow = scene.centroid("E").expect("centroid");
        assert_eq!(scene.epoch(), 2);
        assert!(narrow.0 < wide.0);
    }

    #[test]
    fn only_active_shapes_take_clicks() {
        let store = store();
        let mut scene = MapScene::new(layout(800.0));
        scene.rebuild(layout(800.0), store.regions(), style);
        assert!(scene.click_target("W").is_some());
        assert!(scene.click_target("E").is_none());
        assert!(scene.click_target("Atlantis").is_none());
        assert_eq!(scene.shape("E").map(|s| s.fill), Some(NEUTRAL));
    }
}
