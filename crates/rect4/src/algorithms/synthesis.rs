use tracing::{debug, warn};

use crate::{
    algorithms::clustering::Clustering,
    error::{Rect4Error, Result},
    traits::DebugPlot,
    types::{angle_distance, Edge, EdgeGroup, Rect4Outcome, Ring},
};

pub(crate) const INITIAL_QUAD_COLOR: [u8; 3] = [255, 0, 0];
pub(crate) const CORNER_COLOR: [u8; 3] = [255, 255, 0];

/// Rebuilds corner vertices from the retained side groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadrilateralSynthesizer;

impl QuadrilateralSynthesizer {
    /// Retained groups with `best_edge` and `sort_key` filled in, ordered
    /// clockwise starting from the side closest to horizontal.
    pub fn order_sides(&self, clustering: &Clustering) -> Vec<EdgeGroup> {
        let Some(first_edge) = clustering.edges.first() else {
            return Vec::new();
        };

        let mut sides: Vec<EdgeGroup> = clustering
            .retained()
            .map(|group| {
                let best = clustering.edges.iter().fold(*first_edge, |best, e| {
                    if angle_distance(group.avg_angle, e.angle) < angle_distance(group.avg_angle, best.angle) {
                        *e
                    } else {
                        best
                    }
                });
                EdgeGroup {
                    best_edge: Some(best),
                    ..group.clone()
                }
            })
            .collect();

        let best_angle = |g: &EdgeGroup| g.best_edge.map_or(0.0, |e| e.angle);

        let mut top_angle: f64 = 0.0;
        for (i, side) in sides.iter().enumerate() {
            let angle = best_angle(side);
            if i == 0 || angle.abs() < top_angle.abs() {
                top_angle = angle;
            }
        }

        for side in &mut sides {
            let mut key = best_angle(side) - top_angle;
            if key < 0.0 {
                key += 360.0;
            }
            side.sort_key = key;
        }
        sides.sort_by(|a, b| a.sort_key.total_cmp(&b.sort_key));

        for (i, side) in sides.iter().enumerate() {
            debug!(
                side = i,
                arc_len = side.arc_len,
                best_angle = best_angle(side),
                sort_key = side.sort_key,
                "ordered side"
            );
        }
        sides
    }

    /// Intersect consecutive sides into a quadrilateral.
    ///
    /// Anything other than exactly four retained sides yields
    /// [`Rect4Outcome::NotQuadrilateral`]; that is an expected outcome, not an error.
    pub fn synthesize(&self, clustering: &Clustering, plot: &mut dyn DebugPlot) -> Result<Rect4Outcome> {
        let sides = self.order_sides(clustering);
        if sides.len() != 4 {
            warn!(sides = sides.len(), "could not find a 4-sided bounding polygon");
            return Ok(Rect4Outcome::NotQuadrilateral { sides: sides.len() });
        }

        let lines: Vec<Edge> = sides.iter().filter_map(|s| s.best_edge).collect();
        let n = lines.len();
        let mut pts = Vec::with_capacity(n);
        for i in 0..n {
            let j = if i == 0 { n - 1 } else { i - 1 };
            let vertex = lines[i]
                .line_intersection(&lines[j])
                .ok_or(Rect4Error::ParallelEdges { first: j, second: i })?;
            debug!(vertex = i, x = vertex.x, y = vertex.y, "synthesized corner");
            pts.push(vertex);
        }

        plot.plot_ring(&pts, INITIAL_QUAD_COLOR, CORNER_COLOR);
        Ok(Rect4Outcome::Quad(Ring::new(pts)))
    }
}
