use std::collections::{BTreeSet, HashMap};

use crate::dataset::MetricRecord;

/// Output of a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Records with a usable metric, in rank order (rank 1 first).
    pub ranked: Vec<MetricRecord>,
    /// Keys of records whose metric is unavailable, in input order.
    pub excluded: Vec<String>,
}

/// Rank records by metric, highest first.
///
/// Unavailable metrics are dropped into `excluded`. Equal metrics keep their
/// input order, so ranks are `1..=K` with no gaps or repeats.
pub fn rank(records: Vec<MetricRecord>) -> Ranking {
    let mut ranked = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();

    for mut record in records {
        if record.metric.value().is_some() {
            ranked.push(record);
        } else {
            record.rank = None;
            excluded.push(record.postcode);
        }
    }

    // `sort_by` is stable; ties stay in input order.
    ranked.sort_by(|a, b| {
        let (a, b) = (a.metric.value(), b.metric.value());
        b.unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&a.unwrap_or(f64::NEG_INFINITY))
    });
    for (i, record) in ranked.iter_mut().enumerate() {
        record.rank = Some(i as u32 + 1);
    }

    tracing::debug!(
        ranked = ranked.len(),
        excluded = excluded.len(),
        "ranking pass complete"
    );
    Ranking { ranked, excluded }
}

/// One selector entry: the region key and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Read-only lookup over ranked records, keyed by postcode.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    records: Vec<MetricRecord>,
    by_key: HashMap<String, usize>,
}

impl DatasetIndex {
    /// Build from rank-ordered records. A repeated key keeps its first
    /// (higher ranked) record.
    pub fn new(ranked: Vec<MetricRecord>) -> Self {
        let mut records = Vec::with_capacity(ranked.len());
        let mut by_key = HashMap::with_capacity(ranked.len());
        for record in ranked {
            if by_key.contains_key(&record.postcode) {
                tracing::warn!(key = %record.postcode, "duplicate dataset key ignored");
                continue;
            }
            by_key.insert(record.postcode.clone(), records.len());
            records.push(record);
        }
        Self { records, by_key }
    }

    pub fn get(&self, key: &str) -> Option<&MetricRecord> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn rank_of(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|r| r.rank)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricRecord> {
        self.records.iter()
    }

    /// Selector entries sorted by label, then key.
    pub fn choices(&self) -> Vec<Choice> {
        let mut choices: Vec<Choice> = self
            .records
            .iter()
            .map(|r| Choice {
                value: r.postcode.clone(),
                label: r.region.clone(),
            })
            .collect();
        choices.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.value.cmp(&b.value)));
        choices
    }
}

/// Region names that are drawn neutral and ignore clicks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InactiveSet(BTreeSet<String>);

impl InactiveSet {
    /// Union of the configured names, the excluded keys, and every geometry
    /// name that has no ranked record.
    pub fn build<'a>(
        configured: &[String],
        excluded: &[String],
        geometry_names: impl IntoIterator<Item = &'a str>,
        index: &DatasetIndex,
    ) -> Self {
        let mut set: BTreeSet<String> = configured.iter().chain(excluded).cloned().collect();
        for name in geometry_names {
            if !index.contains(name) {
                set.insert(name.to_string());
            }
        }
        Self(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Metric;
    use proptest::prelude::*;

    fn record(key: &str, metric: Metric) -> MetricRecord {
        MetricRecord {
            postcode: key.to_string(),
            region: format!("{key} region"),
            metric,
            rank: None,
            extra_fields: Vec::new(),
        }
    }

    #[test]
    fn ranks_descending_and_excludes_unavailable() {
        let out = rank(vec![
            record("N", Metric::Value(100.0)),
            record("S", Metric::Unavailable),
            record("E", Metric::Value(50.0)),
        ]);
        let ranked: Vec<(&str, Option<u32>)> = out
            .ranked
            .iter()
            .map(|r| (r.postcode.as_str(), r.rank))
            .collect();
        assert_eq!(ranked, vec![("N", Some(1)), ("E", Some(2))]);
        assert_eq!(out.excluded, vec!["S".to_string()]);
    }

    #[test]
    fn ties_keep_input_order() {
        let out = rank(vec![
            record("A", Metric::Value(5.0)),
            record("B", Metric::Value(9.0)),
            record("C", Metric::Value(5.0)),
            record("D", Metric::Value(5.0)),
        ]);
        let keys: Vec<&str> = out.ranked.iter().map(|r| r.postcode.as_str()).collect();
        assert_eq!(keys, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn all_unavailable_ranks_nothing() {
        let out = rank(vec![
            record("X", Metric::Unavailable),
            record("Y", Metric::Unavailable),
        ]);
        assert!(out.ranked.is_empty());
        assert_eq!(out.excluded, vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn index_looks_up_by_key_and_keeps_first_duplicate() {
        let out = rank(vec![
            record("N", Metric::Value(3.0)),
            record("N", Metric::Value(1.0)),
            record("E", Metric::Value(2.0)),
        ]);
        let index = DatasetIndex::new(out.ranked);
        assert_eq!(index.len(), 2);
        assert_eq!(index.rank_of("N"), Some(1));
        assert_eq!(index.rank_of("E"), Some(2));
        assert!(index.get("S").is_none());
    }

    #[test]
    fn choices_sort_by_label() {
        let mut records = vec![
            record("N", Metric::Value(3.0)),
            record("E", Metric::Value(2.0)),
            record("W", Metric::Value(1.0)),
        ];
        records[0].region = "North".into();
        records[1].region = "East".into();
        records[2].region = "Bath".into();
        let index = DatasetIndex::new(rank(records).ranked);
        let labels: Vec<String> = index.choices().into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Bath", "East", "North"]);
    }

    #[test]
    fn inactive_set_joins_configured_excluded_and_unmatched() {
        let out = rank(vec![
            record("N", Metric::Value(3.0)),
            record("S", Metric::Unavailable),
        ]);
        let index = DatasetIndex::new(out.ranked);
        let inactive = InactiveSet::build(
            &["Ireland".to_string()],
            &out.excluded,
            ["N", "S", "Ireland", "ZE"],
            &index,
        );
        let names: Vec<&str> = inactive.iter().collect();
        assert_eq!(names, vec!["Ireland", "S", "ZE"]);
        assert!(!inactive.contains("N"));
    }

    fn arb_metric() -> impl Strategy<Value = Metric> {
        prop_oneof![
            1 => Just(Metric::Unavailable),
            // Small integer range so ties are common.
            4 => (0u8..8).prop_map(|v| Metric::Value(v as f64)),
        ]
    }

    proptest! {
        #[test]
        fn ranks_are_contiguous_and_keys_partition(metrics in prop::collection::vec(arb_metric(), 0..40)) {
            let records: Vec<MetricRecord> = metrics
                .iter()
                .enumerate()
                .map(|(i, m)| record(&format!("K{i}"), *m))
                .collect();
            let available = metrics.iter().filter(|m| m.value().is_some()).count();

            let out = rank(records);

            let ranks: Vec<u32> = out.ranked.iter().filter_map(|r| r.rank).collect();
            let expected: Vec<u32> = (1..=available as u32).collect();
            prop_assert_eq!(ranks, expected);

            let mut keys: Vec<String> = out
                .ranked
                .iter()
                .map(|r| r.postcode.clone())
                .chain(out.excluded.iter().cloned())
                .collect();
            keys.sort();
            let mut all: Vec<String> = (0..metrics.len()).map(|i| format!("K{i}")).collect();
            all.sort();
            prop_assert_eq!(keys, all);
        }

        #[test]
        fn metrics_never_increase_and_ties_are_stable(metrics in prop::collection::vec(arb_metric(), 0..40)) {
            let records: Vec<MetricRecord> = metrics
                .iter()
                .enumerate()
                .map(|(i, m)| record(&format!("{i}"), *m))
                .collect();
            let out = rank(records);

            for pair in out.ranked.windows(2) {
                let (a, b) = (pair[0].metric.value(), pair[1].metric.value());
                prop_assert!(a >= b);
                if a == b {
                    let ia: usize = pair[0].postcode.parse().unwrap();
                    let ib: usize = pair[1].postcode.parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }
    }
}
