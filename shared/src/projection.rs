use std::f64::consts::FRAC_PI_4;
use std::fmt::Write;

use geo::{Coord, LineString, MultiPolygon, Polygon, Rect};

/// Latitude limit where spherical Mercator is usually cut off.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Spherical Mercator: `screen = translate + scale * raw(lon, lat)` with the
/// y axis pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: (f64, f64),
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: (0.0, 0.0),
        }
    }
}

fn raw(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (lon.to_radians(), -(FRAC_PI_4 + lat / 2.0).tan().ln())
}

impl Mercator {
    /// Scale and translate so `extent` (lon/lat degrees) is centered in a
    /// `width` x `height` box and touches it on the tighter axis.
    pub fn fit_size(width: f64, height: f64, extent: Rect<f64>) -> Self {
        let (x0, y1) = raw(extent.min().x, extent.min().y);
        let (x1, y0) = raw(extent.max().x, extent.max().y);
        let (dx, dy) = (x1 - x0, y1 - y0);

        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (width / dx).min(height / dy),
            (true, false) => width / dx,
            (false, true) => height / dy,
            (false, false) => 1.0,
        };
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };

        Self {
            scale,
            translate: (
                (width - scale * (x1 + x0)) / 2.0,
                (height - scale * (y1 + y0)) / 2.0,
            ),
        }
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = raw(lon, lat);
        (
            self.translate.0 + self.scale * x,
            self.translate.1 + self.scale * y,
        )
    }

    /// Project a lon/lat geometry into screen space.
    pub fn project_multipolygon(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let ring = |ls: &LineString<f64>| -> LineString<f64> {
            ls.coords()
                .map(|c| {
                    let (x, y) = self.project(c.x, c.y);
                    Coord { x, y }
                })
                .collect()
        };
        mp.iter()
            .map(|p| Polygon::new(ring(p.exterior()), p.interiors().iter().map(&ring).collect()))
            .collect()
    }
}

/// SVG path data for a projected geometry, one closed subpath per ring.
pub fn svg_path(mp: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in mp {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            // Closing point duplicates the first one; `Z` covers it.
            let n = ring.0.len().saturating_sub(1);
            if n < 3 {
                continue;
            }
            for (i, c) in ring.0[..n].iter().enumerate() {
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{:.2},{:.2}", c.x, c.y);
            }
            d.push('Z');
        }
    }
    d
}
