use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::algorithms::refine::RefineStats;

/// A real-valued point in pixel coordinates (x right, y down).
pub type Vertex = Coord<f64>;

/// Circular distance between two angles in degrees, in `[0, 180]`.
pub fn angle_distance(a1: f64, a2: f64) -> f64 {
    let d = (a1 - a2).abs();
    if d <= 180.0 { d } else { 360.0 - d }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    pub fn union(&self, other: &Bbox) -> Bbox {
        Bbox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

/// Ordered, implicitly closed sequence of vertices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub pts: Vec<Vertex>,
}

impl Ring {
    pub fn new(pts: Vec<Vertex>) -> Self {
        Self { pts }
    }

    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self {
            pts: points.iter().map(|&(x, y)| Coord { x, y }).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// A ring needs at least three vertices to enclose anything
    pub fn is_valid(&self) -> bool {
        self.pts.len() >= 3
    }

    /// Iterate over `(start, end)` pairs including the closing segment
    pub fn segments(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| (self.pts[i], self.pts[(i + 1) % n]))
    }

    pub fn bbox(&self) -> Option<Bbox> {
        let first = self.pts.first()?;
        let init = Bbox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(self.pts.iter().fold(init, |b, p| Bbox {
            min_x: b.min_x.min(p.x),
            min_y: b.min_y.min(p.y),
            max_x: b.max_x.max(p.x),
            max_y: b.max_y.max(p.y),
        }))
    }

    /// Convert to geo-types Polygon for geometric operations
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::new(self.pts.clone()), vec![])
    }

    pub fn area(&self) -> f64 {
        use geo::Area;
        self.to_polygon().unsigned_area()
    }

    pub fn perimeter(&self) -> f64 {
        self.segments()
            .map(|(a, b)| (b.x - a.x).hypot(b.y - a.y))
            .sum()
    }
}

/// One facet of the convex hull.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub p0: Vertex,
    pub p1: Vertex,
    /// Direction in degrees, `atan2(dy, dx)`
    pub angle: f64,
    pub length: f64,
    /// Side group, assigned by the clusterer
    pub group: Option<usize>,
}

impl Edge {
    pub fn new(p0: Vertex, p1: Vertex) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        Self {
            p0,
            p1,
            angle: dy.atan2(dx).to_degrees(),
            length: dx.hypot(dy),
            group: None,
        }
    }

    pub fn with_group(self, group: usize) -> Self {
        Self {
            group: Some(group),
            ..self
        }
    }

    /// Intersection of the infinite lines through `self` and `other`.
    ///
    /// Returns `None` when the lines are parallel (or either edge has zero length).
    pub fn line_intersection(&self, other: &Edge) -> Option<Vertex> {
        let d1 = self.p1 - self.p0;
        let d2 = other.p1 - other.p0;
        let denom = d1.x * d2.y - d1.y * d2.x;
        if denom == 0.0 {
            return None;
        }
        let w = other.p0 - self.p0;
        let t = (w.x * d2.y - w.y * d2.x) / denom;
        Some(Coord {
            x: self.p0.x + t * d1.x,
            y: self.p0.y + t * d1.y,
        })
    }
}

/// A run of nearly collinear hull edges treated as one logical side.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGroup {
    pub arc_len: f64,
    /// Sum of length-weighted unit directions
    pub wx: f64,
    pub wy: f64,
    pub avg_angle: f64,
    pub retained: bool,
    /// Real hull edge closest in angle to `avg_angle`
    pub best_edge: Option<Edge>,
    /// Clockwise angle from the top side, in `[0, 360)`
    pub sort_key: f64,
}

impl Default for EdgeGroup {
    fn default() -> Self {
        Self {
            arc_len: 0.0,
            wx: 0.0,
            wy: 0.0,
            avg_angle: 0.0,
            retained: false,
            best_edge: None,
            sort_key: 0.0,
        }
    }
}

/// Result of quadrilateral synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rect4Outcome {
    /// Four corners, clockwise from the top side
    Quad(Ring),
    /// The hull did not collapse into exactly four sides
    NotQuadrilateral { sides: usize },
}

impl Rect4Outcome {
    pub fn ring(&self) -> Option<&Ring> {
        match self {
            Self::Quad(ring) => Some(ring),
            Self::NotQuadrilateral { .. } => None,
        }
    }

    pub fn into_ring(self) -> Option<Ring> {
        match self {
            Self::Quad(ring) => Some(ring),
            Self::NotQuadrilateral { .. } => None,
        }
    }

    pub fn is_quad(&self) -> bool {
        matches!(self, Self::Quad(_))
    }
}

/// Everything a pipeline run produced for one mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedFootprint {
    pub outcome: Rect4Outcome,
    /// Quadrilateral before refinement, if one was found
    pub initial: Option<Ring>,
    pub refine_stats: Option<RefineStats>,
    pub image_width: usize,
    pub image_height: usize,
}
