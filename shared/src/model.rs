use crate::colors::{ColorMapper, NEUTRAL, Rgb};
use crate::config::DatasetConfig;
use crate::dataset::{MetricRecord, parse_csv};
use crate::error::LoadError;
use crate::geometry::GeometryStore;
use crate::hooks::MapHooks;
use crate::ranking::{DatasetIndex, InactiveSet, rank};
use crate::scene::ShapeStyle;

/// Everything derived from the two startup sources. Read-only after load.
#[derive(Debug, Clone)]
pub struct ChoroplethModel {
    pub geometry: GeometryStore,
    pub index: DatasetIndex,
    pub inactive: InactiveSet,
    pub colors: ColorMapper,
}

impl ChoroplethModel {
    /// Parse both sources, rank, and derive the inactive set. `inactive_features`
    /// are the names configured on the map itself.
    pub fn from_sources(
        geometry_text: &str,
        dataset_text: &str,
        dataset: &DatasetConfig,
        inactive_features: &[String],
    ) -> Result<Self, LoadError> {
        let geometry = GeometryStore::parse(geometry_text, &dataset.topology_object)?;
        let records = parse_csv(dataset_text, &dataset.columns)?;
        let configured: Vec<String> = dataset
            .always_inactive
            .iter()
            .chain(inactive_features)
            .cloned()
            .collect();
        Ok(Self::assemble(geometry, records, &configured))
    }

    pub fn assemble(
        geometry: GeometryStore,
        records: Vec<MetricRecord>,
        configured_inactive: &[String],
    ) -> Self {
        let ranking = rank(records);
        let index = DatasetIndex::new(ranking.ranked);
        let inactive =
            InactiveSet::build(configured_inactive, &ranking.excluded, geometry.names(), &index);
        let colors = ColorMapper::new(index.len() as u32);
        tracing::info!(
            regions = geometry.len(),
            ranked = index.len(),
            inactive = inactive.len(),
            "map data ready"
        );
        Self {
            geometry,
            index,
            inactive,
            colors,
        }
    }

    /// Active regions are colored and clickable.
    pub fn is_active(&self, name: &str) -> bool {
        !self.inactive.contains(name) && self.index.contains(name)
    }

    /// Rank-derived color. Inactive names get [`NEUTRAL`].
    pub fn color_for(&self, name: &str) -> Rgb {
        if self.is_active(name) {
            self.colors.color_for(self.index.rank_of(name))
        } else {
            NEUTRAL
        }
    }

    /// Fill for a shape: the caller's color hook wins for active regions.
    pub fn fill_for(&self, name: &str, hooks: &MapHooks) -> Rgb {
        if !self.is_active(name) {
            return NEUTRAL;
        }
        hooks.color(name).unwrap_or_else(|| self.color_for(name))
    }

    pub fn shape_style(&self, name: &str, hooks: &MapHooks) -> ShapeStyle {
        ShapeStyle {
            fill: self.fill_for(name, hooks),
            active: self.is_active(name),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const DATASET: &str = "\
Postcode,Region,Order per Capita - 2020,Sweet Dish 1,Sweet Dish 2,Sweet Dish 3
W,Westshire,2.5,Trifle,Eton Mess,Scone
E,Eastshire,4.0,Crumble,Fudge,Tart
S,Southshire,n/a,,,
";
}

#[cfg(test)]
mod tests {
    use super::fixtures::DATASET;
    use super::*;
    use crate::colors::RANK_PALETTE;
    use crate::geometry::fixtures::TOPOLOGY;

    fn model(inactive: &[String]) -> ChoroplethModel {
        ChoroplethModel::from_sources(TOPOLOGY, DATASET, &DatasetConfig::default(), inactive)
            .expect("fixtures load")
    }

    #[test]
    fn loads_and_ranks_fixture_sources() {
        let m = model(&[]);
        assert_eq!(m.geometry.len(), 2);
        assert_eq!(m.index.rank_of("E"), Some(1));
        assert_eq!(m.index.rank_of("W"), Some(2));
        assert!(m.inactive.contains("S"));
        assert!(m.inactive.contains("Ireland"));
        assert!(m.is_active("W"));
    }

    #[test]
    fn configured_inactive_names_are_neutral() {
        let m = model(&["W".to_string()]);
        assert!(!m.is_active("W"));
        assert_eq!(m.color_for("W"), NEUTRAL);
        assert_eq!(m.fill_for("W", &MapHooks::default()), NEUTRAL);
    }

    #[test]
    fn rank_one_gets_darkest_color() {
        let m = model(&[]);
        assert_eq!(m.color_for("E"), RANK_PALETTE[0]);
        assert_eq!(m.color_for("unknown"), NEUTRAL);
    }

    #[test]
    fn color_hook_applies_only_to_active_regions() {
        let m = model(&[]);
        let hooks = MapHooks::default().with_color(|_| Rgb(1, 2, 3));
        assert_eq!(m.fill_for("E", &hooks), Rgb(1, 2, 3));
        assert_eq!(m.fill_for("S", &hooks), NEUTRAL);
    }

    #[test]
    fn repeated_keys_rank_contiguously() {
        let csv = "Postcode,Region,Order per Capita - 2020\nW,West,9\nW,West,8\nE,East,1\n";
        let m = ChoroplethModel::from_sources(TOPOLOGY, csv, &DatasetConfig::default(), &[])
            .expect("load");
        let ranks: Vec<Option<u32>> = m.index.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![Some(1), Some(2)]);
        assert_eq!(m.index.len(), 2);
    }

    #[test]
    fn unavailable_first_row_makes_key_inactive_only() {
        let csv = "Postcode,Region,Order per Capita - 2020\nW,West,n/a\nW,West,5\nE,East,1\n";
        let m = ChoroplethModel::from_sources(TOPOLOGY, csv, &DatasetConfig::default(), &[])
            .expect("load");
        assert!(!m.index.contains("W"));
        assert!(m.inactive.contains("W"));
        assert_eq!(m.index.rank_of("E"), Some(1));
    }

    #[test]
    fn bad_geometry_aborts_load() {
        let err = ChoroplethModel::from_sources("{}", DATASET, &DatasetConfig::default(), &[])
            .expect_err("no document type");
        assert!(matches!(err, LoadError::UnsupportedGeometry(_)));
    }
}
