//! Scanline rasterization of polygons into per-row crossing lists.
//!
//! A ring edge from `(x0, y0)` to `(x1, y1)` crosses every integer row `y`
//! with `min(y0, y1) <= y < max(y0, y1)`; horizontal edges cross nothing.
//! Crossing positions are rounded to the nearest column. Within a row, pixel
//! `x` is inside when an odd number of crossings are `<= x`.

use crate::{grid::BitGrid, types::Ring};

/// Ascending crossing columns for one row.
pub type RowCrossings = Vec<i64>;

/// Crossing lists for rows `min_y .. min_y + num_rows`.
pub fn row_crossings(rings: &[Ring], min_y: i64, num_rows: usize) -> Vec<RowCrossings> {
    let mut rows = vec![RowCrossings::new(); num_rows];
    if num_rows == 0 {
        return rows;
    }
    let last_row = min_y + num_rows as i64 - 1;

    for ring in rings {
        for (a, b) in ring.segments() {
            if a.y == b.y || !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
                continue;
            }
            let (lo, hi) = if a.y < b.y { (a, b) } else { (b, a) };
            let first = (lo.y.ceil() as i64).max(min_y);
            let last = (hi.y.ceil() as i64 - 1).min(last_row);
            let slope = (hi.x - lo.x) / (hi.y - lo.y);
            for y in first..=last {
                let x = lo.x + (y as f64 - lo.y) * slope;
                rows[(y - min_y) as usize].push(x.round() as i64);
            }
        }
    }

    for row in &mut rows {
        row.sort_unstable();
        cancel_pairs(row);
    }
    rows
}

/// Drop coincident crossings two at a time, which leaves parity unchanged.
fn cancel_pairs(row: &mut RowCrossings) {
    let mut out = Vec::with_capacity(row.len());
    for &x in row.iter() {
        if out.last() == Some(&x) {
            out.pop();
        } else {
            out.push(x);
        }
    }
    *row = out;
}

/// Whether column `x` lies inside according to the even-odd rule
pub fn is_inside(row: &[i64], x: i64) -> bool {
    row.iter().take_while(|&&c| c <= x).count() % 2 == 1
}

/// Walks two crossing lists in step.
///
/// Yields `(x, inside_a, inside_b)` once per distinct crossing column, with
/// the parity flags as they stand from `x` up to the next yielded column.
pub struct ParityEvents<'a> {
    a: &'a [i64],
    b: &'a [i64],
    in_a: bool,
    in_b: bool,
}

impl<'a> ParityEvents<'a> {
    pub fn new(a: &'a [i64], b: &'a [i64]) -> Self {
        Self {
            a,
            b,
            in_a: false,
            in_b: false,
        }
    }
}

impl Iterator for ParityEvents<'_> {
    type Item = (i64, bool, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let x = match (self.a.first(), self.b.first()) {
            (None, None) => return None,
            (Some(&xa), None) => xa,
            (None, Some(&xb)) => xb,
            (Some(&xa), Some(&xb)) => xa.min(xb),
        };
        while self.a.first() == Some(&x) {
            self.in_a = !self.in_a;
            self.a = &self.a[1..];
        }
        while self.b.first() == Some(&x) {
            self.in_b = !self.in_b;
            self.b = &self.b[1..];
        }
        Some((x, self.in_a, self.in_b))
    }
}

/// Crossings of the region inside both `a` and `b`.
pub fn crossings_intersection(a: &[i64], b: &[i64]) -> RowCrossings {
    let mut out = RowCrossings::new();
    let mut inside = false;
    for (x, in_a, in_b) in ParityEvents::new(a, b) {
        if (in_a && in_b) != inside {
            inside = !inside;
            out.push(x);
        }
    }
    out
}

/// Fill a `width` x `height` grid with the pixels covered by `rings`
pub fn polygon_mask(rings: &[Ring], width: usize, height: usize) -> BitGrid {
    let mut mask = BitGrid::new(width, height);
    for (y, row) in row_crossings(rings, 0, height).iter().enumerate() {
        for span in row.chunks_exact(2) {
            let from = span[0].clamp(0, width as i64) as usize;
            let to = span[1].clamp(0, width as i64) as usize;
            for x in from..to {
                mask.set(x, y, true);
            }
        }
    }
    mask
}
