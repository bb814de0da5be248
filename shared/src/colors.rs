use std::fmt;

use serde::{Deserialize, Serialize};

/// An sRGB color token, rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb` or `rrggbb` (case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Rank 1 gets the first (darkest) entry.
pub const RANK_PALETTE: [Rgb; 4] = [
    Rgb(0xff, 0x80, 0x00),
    Rgb(0xff, 0xac, 0x59),
    Rgb(0xff, 0xd9, 0xb2),
    Rgb(0xff, 0xea, 0xd4),
];

/// Fill for inactive regions and anything without a rank.
pub const NEUTRAL: Rgb = Rgb(0xd7, 0xd7, 0xd7);

/// Shape outline.
pub const STROKE: Rgb = Rgb(0xff, 0xff, 0xff);

/// Discrete scale that splits a sampled domain into equally populated buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileScale<T> {
    thresholds: Vec<f64>,
    range: Vec<T>,
}

impl<T: Clone> QuantileScale<T> {
    /// Build from domain samples (any order, non-finite values dropped) and an
    /// output range. Returns `None` when either is empty.
    pub fn new(domain: impl IntoIterator<Item = f64>, range: Vec<T>) -> Option<Self> {
        let mut samples: Vec<f64> = domain.into_iter().filter(|v| v.is_finite()).collect();
        if samples.is_empty() || range.is_empty() {
            return None;
        }
        samples.sort_by(f64::total_cmp);

        let buckets = range.len();
        let thresholds = (1..buckets)
            .map(|i| quantile_sorted(&samples, i as f64 / buckets as f64))
            .collect();
        Some(Self { thresholds, range })
    }

    /// Bucket boundaries; a value equal to a threshold falls in the upper bucket.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn bucket(&self, value: f64) -> usize {
        self.thresholds.partition_point(|t| *t <= value)
    }

    pub fn map(&self, value: f64) -> T {
        self.range[self.bucket(value)].clone()
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len() - 1;
    let pos = last as f64 * p.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(last);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Maps a rank in `1..=total` to a palette color.
///
/// The scale is fitted over the extent `[1, total]` only, so bucket edges sit
/// at evenly spaced rank positions regardless of how many regions exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    scale: Option<QuantileScale<Rgb>>,
    total: u32,
}

impl ColorMapper {
    pub fn new(total_ranked: u32) -> Self {
        Self::with_palette(total_ranked, RANK_PALETTE.to_vec())
    }

    pub fn with_palette(total_ranked: u32, palette: Vec<Rgb>) -> Self {
        let scale = if total_ranked == 0 {
            None
        } else {
            QuantileScale::new([1.0, total_ranked as f64], palette)
        };
        Self {
            scale,
            total: total_ranked,
        }
    }

    pub fn total_ranked(&self) -> u32 {
        self.total
    }

    /// Color for a rank, or [`NEUTRAL`] when the rank is absent.
    pub fn color_for(&self, rank: Option<u32>) -> Rgb {
        match (rank, &self.scale) {
            (Some(rank), Some(scale)) => scale.map(rank as f64),
            _ => NEUTRAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_display() {
        let orange = Rgb::from_hex("#FF8000").expect("valid hex");
        assert_eq!(orange, Rgb(255, 128, 0));
        assert_eq!(orange.to_hex(), "#ff8000");
        assert_eq!(Rgb::from_hex("d7d7d7"), Some(NEUTRAL));
    }

    #[test]
    fn hex_rejects_malformed_input() {
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::from_hex("#ff80001"), None);
    }

    #[test]
    fn quantile_thresholds_interpolate_two_point_extent() {
        let scale = QuantileScale::new([1.0, 121.0], vec!['a', 'b', 'c', 'd']).expect("scale");
        assert_eq!(scale.thresholds(), &[31.0, 61.0, 91.0]);
        assert_eq!(scale.map(1.0), 'a');
        assert_eq!(scale.map(30.9), 'a');
        assert_eq!(scale.map(31.0), 'b');
        assert_eq!(scale.map(90.0), 'c');
        assert_eq!(scale.map(121.0), 'd');
    }

    #[test]
    fn quantile_scale_sorts_unordered_samples() {
        let scale = QuantileScale::new([9.0, 1.0, 5.0], vec![0, 1]).expect("scale");
        assert_eq!(scale.thresholds(), &[5.0]);
    }

    #[test]
    fn quantile_scale_requires_domain_and_range() {
        assert!(QuantileScale::<u8>::new([], vec![1]).is_none());
        assert!(QuantileScale::<u8>::new([1.0, f64::NAN], vec![]).is_none());
    }

    #[test]
    fn top_rank_is_darkest_and_bottom_rank_is_lightest() {
        let mapper = ColorMapper::new(40);
        assert_eq!(mapper.color_for(Some(1)), RANK_PALETTE[0]);
        assert_eq!(mapper.color_for(Some(40)), RANK_PALETTE[3]);
    }

    #[test]
    fn color_for_is_pure() {
        let mapper = ColorMapper::new(17);
        for rank in 1..=17 {
            assert_eq!(mapper.color_for(Some(rank)), mapper.color_for(Some(rank)));
        }
        assert_eq!(ColorMapper::new(17), mapper);
    }

    #[test]
    fn unranked_and_empty_domain_get_neutral() {
        assert_eq!(ColorMapper::new(10).color_for(None), NEUTRAL);
        assert_eq!(ColorMapper::new(0).color_for(Some(1)), NEUTRAL);
    }

    #[test]
    fn single_ranked_region_uses_last_bucket() {
        // Degenerate extent [1, 1]: every threshold equals 1.
        let mapper = ColorMapper::new(1);
        assert_eq!(mapper.color_for(Some(1)), RANK_PALETTE[3]);
    }
}
