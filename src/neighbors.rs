//! Pixel spacing and neighbor-graph derivation from raw pixel centers.
//!
//! All functions here work on bare coordinate slices in one consistent unit;
//! [`CameraGeometry`](crate::CameraGeometry) strips units before calling them.

use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::pixel_index::PixelIndex;

/// Default neighbor search radius, in units of the minimum pixel separation.
///
/// Captures the first ring of both lattices (distance 1) while excluding square
/// diagonals (√2) and the second hexagonal ring (√3).
pub const NEIGHBOR_RADIUS_FACTOR: f64 = 1.4;

fn check_lengths(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(GeometryError::LengthMismatch {
            field: "y",
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    Ok(())
}

/// Exact minimum positive distance between any two pixel centers.
///
/// Sweep along the axis of larger extent: points are visited in sorted order and
/// compared backwards only while the gap along the sweep axis is below the best
/// distance so far. Coincident points are skipped.
pub fn min_pixel_separation(xs: &[f64], ys: &[f64]) -> Result<f64> {
    check_lengths(xs, ys)?;
    let n = xs.len();
    if n < 2 {
        return Err(GeometryError::TooFewPixels(n));
    }

    let extent = |v: &[f64]| {
        let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    let (primary, secondary) = if extent(xs) >= extent(ys) {
        (xs, ys)
    } else {
        (ys, xs)
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| primary[a].total_cmp(&primary[b]));

    let mut best = f64::INFINITY;
    for k in 1..n {
        let i = order[k];
        for &j in order[..k].iter().rev() {
            let dp = primary[i] - primary[j];
            if dp >= best {
                break;
            }
            let ds = secondary[i] - secondary[j];
            let d = (dp * dp + ds * ds).sqrt();
            if d > 0.0 && d < best {
                best = d;
            }
        }
    }

    if !best.is_finite() {
        // Every pair coincides.
        return Err(GeometryError::TooFewPixels(1));
    }
    Ok(best)
}

/// For every pixel, the indices of all other pixels within `rad` (inclusive).
///
/// Each neighbor list is sorted ascending. The relation is symmetric.
pub fn find_neighbor_pixels(xs: &[f64], ys: &[f64], rad: f64) -> Result<Vec<Vec<usize>>> {
    check_lengths(xs, ys)?;
    let index = PixelIndex::new(xs, ys, rad);
    let neighbors: Vec<Vec<usize>> = (0..xs.len())
        .map(|i| {
            let mut found = index.query_indices(xs[i], ys[i], rad);
            found.retain(|&j| j != i);
            found
        })
        .collect();

    debug!(
        "Neighbor search over {} pixels with radius {:.4} (cell {:.4}): median {} neighbors",
        xs.len(),
        rad,
        index.cell_size(),
        median_neighbor_count(&neighbors)
    );
    Ok(neighbors)
}

/// Radius used when the caller does not supply one.
pub fn default_neighbor_radius(xs: &[f64], ys: &[f64]) -> Result<f64> {
    Ok(NEIGHBOR_RADIUS_FACTOR * min_pixel_separation(xs, ys)?)
}

/// Median of the per-pixel neighbor counts (mean of the two middle values for
/// an even count). Zero for an empty list.
pub fn median_neighbor_count(neighbors: &[Vec<usize>]) -> f64 {
    let counts: Vec<usize> = neighbors.iter().map(Vec::len).collect();
    median(&counts)
}

pub(crate) fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    }
}

/// Evenly spaced values from `start` to `stop` inclusive, with `stop` exact.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            out[n - 1] = stop;
            out
        }
    }
}
