use geo_types::Coord;
use tracing::debug;

use crate::{
    error::{Rect4Error, Result},
    traits::{DebugPlot, MaskGrid},
    types::Edge,
};

pub(crate) const HULL_COLOR: [u8; 3] = [0, 255, 0];

type Pt = (i64, i64);

fn cross(a: Pt, b: Pt) -> i64 {
    a.0 * b.1 - a.1 * b.0
}

fn vertex(p: Pt) -> Coord<f64> {
    Coord {
        x: p.0 as f64,
        y: p.1 as f64,
    }
}

/// Convex hull of a mask's set pixels, traced as a cycle of edges.
///
/// Only the leftmost and rightmost set pixel of each row can lie on the hull,
/// so those are the sole candidates. Starting from the rightmost pixel of the
/// top row and heading right, each step picks the candidate that turns the
/// sweep direction clockwise by the smallest amount. Directions are compared
/// with integer cross products; collinear candidates resolve to the farther
/// one so intermediate points on a facet are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexBoundaryWalker;

impl ConvexBoundaryWalker {
    pub fn walk<M: MaskGrid + ?Sized>(&self, mask: &M, plot: &mut dyn DebugPlot) -> Result<Vec<Edge>> {
        let candidates: Vec<Pt> = (0..mask.height())
            .filter_map(|y| mask.row_extent(y).map(|(l, r)| (y as i64, l as i64, r as i64)))
            .flat_map(|(y, l, r)| [(l, y), (r, y)])
            .collect();

        // rightmost pixel of the first populated row
        let start = *candidates.get(1).ok_or(Rect4Error::EmptyInput)?;
        debug!(x = start.0, y = start.1, candidates = candidates.len(), "hull sweep start");

        let max_edges = candidates.len() + 1;
        let mut edges = Vec::new();
        let mut pivot = start;
        let mut direction: Pt = (1, 0);

        loop {
            plot.plot_point(vertex(pivot), HULL_COLOR);

            let (next, next_dir) = next_hull_point(pivot, direction, &candidates).ok_or_else(|| {
                Rect4Error::DegenerateHull(format!(
                    "no hull vertex follows ({}, {}) after {} edges",
                    pivot.0,
                    pivot.1,
                    edges.len()
                ))
            })?;

            edges.push(Edge::new(vertex(pivot), vertex(next)));
            pivot = next;

            // closed: either back at the start, or heading down again after climbing
            if pivot == start || (direction.1 < 0 && next_dir.1 >= 0) {
                break;
            }
            if edges.len() > max_edges {
                return Err(Rect4Error::DegenerateHull(format!(
                    "sweep did not close after {} edges",
                    edges.len()
                )));
            }
            direction = next_dir;
        }

        // a single point or line has no area
        if edges.len() < 3 {
            return Err(Rect4Error::DegenerateHull(format!(
                "convex hull has {} sides",
                edges.len()
            )));
        }

        debug!(edges = edges.len(), "hull sweep closed");
        Ok(edges)
    }
}

/// Candidate with the smallest strictly-clockwise turn from `direction`.
fn next_hull_point(pivot: Pt, direction: Pt, candidates: &[Pt]) -> Option<(Pt, Pt)> {
    let mut best_dir = (-direction.0, -direction.1);
    let mut best = None;

    for &(x, y) in candidates {
        let d = (x - pivot.0, y - pivot.1);
        if cross(d, direction) >= 0 {
            continue;
        }
        let turn = cross(d, best_dir);
        if turn < 0 {
            continue;
        }
        if turn == 0 && d.0 * d.0 + d.1 * d.1 < best_dir.0 * best_dir.0 + best_dir.1 * best_dir.1 {
            continue;
        }
        best_dir = d;
        best = Some((x, y));
    }

    best.map(|p| (p, best_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{grid::BitGrid, traits::NoopPlot};

    fn corners(edges: &[Edge]) -> Vec<(f64, f64)> {
        edges.iter().map(|e| (e.p0.x, e.p0.y)).collect()
    }

    fn assert_closed_and_containing(edges: &[Edge], mask: &BitGrid) {
        for (i, e) in edges.iter().enumerate() {
            let next = &edges[(i + 1) % edges.len()];
            assert_eq!(e.p1, next.p0, "edge {} does not meet edge {}", i, i + 1);
        }
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if !mask.get(x as i64, y as i64) {
                    continue;
                }
                for e in edges {
                    let d = e.p1 - e.p0;
                    let side = d.x * (y as f64 - e.p0.y) - d.y * (x as f64 - e.p0.x);
                    assert!(side >= 0.0, "pixel ({x}, {y}) lies outside edge {:?}", e);
                }
            }
        }
    }

    #[test]
    fn test_square_hull() {
        let mut mask = BitGrid::new(20, 20);
        mask.fill_rect(5, 5, 14, 14);
        let edges = ConvexBoundaryWalker.walk(&mask, &mut NoopPlot).expect("hull");
        assert_eq!(
            corners(&edges),
            vec![(14.0, 5.0), (14.0, 14.0), (5.0, 14.0), (5.0, 5.0)]
        );
        let angles: Vec<f64> = edges.iter().map(|e| e.angle).collect();
        assert_eq!(angles, vec![90.0, 180.0, -90.0, 0.0]);
        assert_closed_and_containing(&edges, &mask);
    }

    #[test]
    fn test_diamond_closes_at_single_pixel_top() {
        let mask = BitGrid::from_fn(21, 21, |x, y| {
            (x as i64 - 10).abs() + (y as i64 - 10).abs() <= 8
        });
        let edges = ConvexBoundaryWalker.walk(&mask, &mut NoopPlot).expect("hull");
        assert_eq!(edges.len(), 4);
        assert_eq!(edges[0].p0, Coord { x: 10.0, y: 2.0 });
        assert_closed_and_containing(&edges, &mask);
    }

    #[test]
    fn test_disk_hull_contains_all_pixels() {
        let mask = BitGrid::from_fn(40, 30, |x, y| {
            let dx = x as f64 - 18.5;
            let dy = y as f64 - 14.0;
            dx * dx + dy * dy <= 11.0 * 11.0
        });
        let edges = ConvexBoundaryWalker.walk(&mask, &mut NoopPlot).expect("hull");
        assert!(edges.len() >= 3);
        assert_closed_and_containing(&edges, &mask);
    }

    #[test]
    fn test_empty_mask_is_rejected() {
        let mask = BitGrid::new(8, 8);
        assert!(matches!(
            ConvexBoundaryWalker.walk(&mask, &mut NoopPlot),
            Err(Rect4Error::EmptyInput)
        ));
    }

    #[test]
    fn test_line_masks_are_degenerate() {
        let mut row = BitGrid::new(10, 10);
        row.fill_rect(2, 4, 8, 4);
        assert!(matches!(
            ConvexBoundaryWalker.walk(&row, &mut NoopPlot),
            Err(Rect4Error::DegenerateHull(_))
        ));

        let mut column = BitGrid::new(10, 10);
        column.fill_rect(3, 1, 3, 8);
        assert!(matches!(
            ConvexBoundaryWalker.walk(&column, &mut NoopPlot),
            Err(Rect4Error::DegenerateHull(_))
        ));

        let mut single = BitGrid::new(10, 10);
        single.set(5, 5, true);
        assert!(ConvexBoundaryWalker.walk(&single, &mut NoopPlot).is_err());
    }
}
