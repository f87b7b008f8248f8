//! Planar spatial index over pixel centers, optimized for fixed-radius queries.
//!
//! `PixelIndex` bins points into a uniform grid of square cells covering the
//! bounding box of the layout. Each cell maps to a compact slice of point
//! indices (`cell_offsets` / `point_indices`, the usual compressed layout).
//!
//! Query flow:
//! 1. Compute the block of cells intersecting the square around the query point.
//! 2. Scan only the points in those cells.
//! 3. Apply the exact Euclidean distance test.
//!
//! With the cell size close to the query radius, each query touches a 3×3 block
//! and the cost follows local pixel density instead of camera size.

/// Upper bound on cells per point, so tiny radii on wide layouts stay bounded in memory.
const MAX_CELLS_PER_POINT: usize = 4;

#[derive(Debug, Clone)]
pub struct PixelIndex {
    xs: Vec<f64>,
    ys: Vec<f64>,
    x_min: f64,
    y_min: f64,
    cell_size: f64,
    n_x: usize,
    n_y: usize,
    cell_offsets: Vec<u32>,
    point_indices: Vec<u32>,
}

impl PixelIndex {
    /// Build an index for points `(xs[i], ys[i])` with cells of roughly `cell_size`.
    ///
    /// The cell size is enlarged when needed to keep the number of cells within
    /// a small multiple of the number of points. Non-positive or non-finite
    /// sizes fall back to a single cell.
    pub fn new(xs: &[f64], ys: &[f64], cell_size: f64) -> Self {
        let n = xs.len().min(ys.len());
        let xs = xs[..n].to_vec();
        let ys = ys[..n].to_vec();

        let (x_min, x_max) = bounds(&xs);
        let (y_min, y_max) = bounds(&ys);
        let width = (x_max - x_min).max(0.0);
        let height = (y_max - y_min).max(0.0);

        let mut cell = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            width.max(height).max(1.0)
        };
        let max_cells = (MAX_CELLS_PER_POINT * n).max(1);
        loop {
            let cells = grid_dim(width, cell).saturating_mul(grid_dim(height, cell));
            if cells <= max_cells {
                break;
            }
            cell *= 2.0;
        }

        let n_x = grid_dim(width, cell);
        let n_y = grid_dim(height, cell);
        let n_cells = n_x * n_y;

        let mut bins: Vec<Vec<u32>> = vec![Vec::new(); n_cells];
        for i in 0..n {
            let (cx, cy) = cell_coords(xs[i], ys[i], x_min, y_min, cell, n_x, n_y);
            bins[cy * n_x + cx].push(i as u32);
        }

        let mut cell_offsets = Vec::with_capacity(n_cells + 1);
        let mut point_indices = Vec::with_capacity(n);
        cell_offsets.push(0);
        for bin in bins {
            point_indices.extend(bin);
            cell_offsets.push(point_indices.len() as u32);
        }

        Self {
            xs,
            ys,
            x_min,
            y_min,
            cell_size: cell,
            n_x,
            n_y,
            cell_offsets,
            point_indices,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Effective cell edge length after the memory cap was applied.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Indices of all points within `radius` (inclusive) of `(x, y)`, ascending.
    pub fn query_indices(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        self.for_each_within(x, y, radius, |idx, _| out.push(idx));
        out.sort_unstable();
        out
    }

    /// Index of the point closest to `(x, y)` among those within `radius`.
    pub fn nearest_within(&self, x: f64, y: f64, radius: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        self.for_each_within(x, y, radius, |idx, d2| match best {
            Some((_, best_d2)) if best_d2 <= d2 => {}
            _ => best = Some((idx, d2)),
        });
        best.map(|(idx, _)| idx)
    }

    /// Visit every point within `radius` of `(x, y)` with its squared distance.
    fn for_each_within<F>(&self, x: f64, y: f64, radius: f64, mut f: F)
    where
        F: FnMut(usize, f64),
    {
        if self.is_empty() || radius.is_nan() || radius < 0.0 {
            return;
        }
        let r2 = radius * radius;

        let Some((cx_lo, cx_hi)) = self.cell_span(x - radius, x + radius, self.x_min, self.n_x)
        else {
            return;
        };
        let Some((cy_lo, cy_hi)) = self.cell_span(y - radius, y + radius, self.y_min, self.n_y)
        else {
            return;
        };

        for cy in cy_lo..=cy_hi {
            for cx in cx_lo..=cx_hi {
                let cell = cy * self.n_x + cx;
                let start = self.cell_offsets[cell] as usize;
                let end = self.cell_offsets[cell + 1] as usize;
                for &idx in &self.point_indices[start..end] {
                    let idx = idx as usize;
                    let dx = self.xs[idx] - x;
                    let dy = self.ys[idx] - y;
                    let d2 = dx * dx + dy * dy;
                    if d2 <= r2 {
                        f(idx, d2);
                    }
                }
            }
        }
    }

    /// Inclusive range of cell coordinates overlapping `[lo, hi]` along one axis.
    fn cell_span(&self, lo: f64, hi: f64, origin: f64, n: usize) -> Option<(usize, usize)> {
        let first = ((lo - origin) / self.cell_size).floor();
        let last = ((hi - origin) / self.cell_size).floor();
        if last < 0.0 || first > (n - 1) as f64 {
            return None;
        }
        let first = first.max(0.0) as usize;
        let last = (last as usize).min(n - 1);
        Some((first, last))
    }
}

fn bounds(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn grid_dim(extent: f64, cell: f64) -> usize {
    ((extent / cell).floor() as usize).saturating_add(1)
}

fn cell_coords(
    x: f64,
    y: f64,
    x_min: f64,
    y_min: f64,
    cell: f64,
    n_x: usize,
    n_y: usize,
) -> (usize, usize) {
    let cx = (((x - x_min) / cell).floor().max(0.0) as usize).min(n_x - 1);
    let cy = (((y - y_min) / cell).floor().max(0.0) as usize).min(n_y - 1);
    (cx, cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize, pitch: f64) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for row in 0..n {
            for col in 0..n {
                xs.push(col as f64 * pitch);
                ys.push(row as f64 * pitch);
            }
        }
        (xs, ys)
    }

    #[test]
    fn test_query_matches_brute_force() {
        let (xs, ys) = grid(12, 0.7);
        let index = PixelIndex::new(&xs, &ys, 0.7);
        for &(qx, qy, r) in &[(0.0, 0.0, 0.75), (3.5, 2.1, 1.5), (7.7, 7.7, 0.1), (-3.0, 4.0, 2.0)] {
            let got = index.query_indices(qx, qy, r);
            let expected: Vec<usize> = (0..xs.len())
                .filter(|&i| (xs[i] - qx).powi(2) + (ys[i] - qy).powi(2) <= r * r)
                .collect();
            assert_eq!(got, expected, "query at ({qx}, {qy}) radius {r}");
        }
    }

    #[test]
    fn test_cell_budget() {
        let (xs, ys) = grid(10, 1.0);
        // A tiny cell size would need ~10^10 cells without the cap.
        let index = PixelIndex::new(&xs, &ys, 1e-4);
        assert!(index.cell_size() > 1e-4);
        assert_eq!(index.query_indices(5.0, 5.0, 1.0), vec![45, 54, 55, 56, 65]);
    }

    #[test]
    fn test_wide_sparse_layout() {
        // Extent / cell ratio beyond 2^32 on both axes.
        let xs = [0.0, 1e10, 0.0, 1e10];
        let ys = [0.0, 0.0, 1e10, 1e10];
        let index = PixelIndex::new(&xs, &ys, 1.0);
        assert!(index.cell_size() >= 1e9);
        assert_eq!(index.query_indices(1e10, 0.0, 1.0), vec![1]);
        assert_eq!(index.query_indices(5e9, 5e9, 1e10), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nearest_within() {
        let (xs, ys) = grid(5, 1.0);
        let index = PixelIndex::new(&xs, &ys, 1.0);
        assert_eq!(index.nearest_within(2.1, 2.9, 1.0), Some(17));
        assert_eq!(index.nearest_within(20.0, 20.0, 1.0), None);
    }

    #[test]
    fn test_empty_and_degenerate() {
        let index = PixelIndex::new(&[], &[], 1.0);
        assert!(index.is_empty());
        assert!(index.query_indices(0.0, 0.0, 10.0).is_empty());

        // All points on one vertical line.
        let xs = vec![1.0; 4];
        let ys = vec![0.0, 1.0, 2.0, 3.0];
        let index = PixelIndex::new(&xs, &ys, 1.0);
        assert_eq!(index.query_indices(1.0, 1.0, 1.0), vec![0, 1, 2]);
    }
}
