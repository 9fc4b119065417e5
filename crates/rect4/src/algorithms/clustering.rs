use tracing::debug;

use crate::{
    config::Rect4Params,
    error::{Rect4Error, Result},
    types::{angle_distance, Edge, EdgeGroup},
};

/// Hull edges labelled with side groups, plus the per-group accumulators.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Every hull edge, each with `group` set
    pub edges: Vec<Edge>,
    /// Indexed by group id; includes groups that were not retained
    pub groups: Vec<EdgeGroup>,
}

impl Clustering {
    pub fn retained(&self) -> impl Iterator<Item = &EdgeGroup> {
        self.groups.iter().filter(|g| g.retained)
    }
}

/// Collapses runs of nearly collinear hull edges into logical sides.
#[derive(Debug, Clone)]
pub struct EdgeClusterer {
    pub length_ratio: f64,
    pub max_angle_deg: f64,
    pub side_divisor: usize,
}

impl Default for EdgeClusterer {
    fn default() -> Self {
        Self::from_params(&Rect4Params::default())
    }
}

impl EdgeClusterer {
    pub fn from_params(params: &Rect4Params) -> Self {
        Self {
            length_ratio: params.merge_length_ratio,
            max_angle_deg: params.merge_max_angle_deg,
            side_divisor: params.side_divisor,
        }
    }

    /// Whether `r` continues the side that `l` belongs to.
    ///
    /// Long edges tolerate a proportionally larger bend than short ones.
    pub fn merges(&self, l: &Edge, r: &Edge) -> bool {
        let len = l.length + r.length;
        let adiff = angle_distance(l.angle, r.angle);
        len > adiff * self.length_ratio && adiff < self.max_angle_deg
    }

    /// Assign a group id to every edge. Returns the labels and the number of ids handed out.
    ///
    /// The first pass walks the edges in order, starting a new group whenever
    /// an adjacent pair fails to merge. If the last edge merges with the first,
    /// the trailing run that shares the last edge's group is relabelled into the
    /// first edge's group so a side straddling the array boundary stays whole.
    /// The trailing group id is left empty in that case.
    pub fn label(&self, edges: &[Edge]) -> (Vec<Option<usize>>, usize) {
        let n = edges.len();
        let mut labels = vec![None; n];
        if n == 0 {
            return (labels, 0);
        }

        let mut num_groups = 1;
        labels[0] = Some(0);
        for i in 0..n - 1 {
            labels[i + 1] = if self.merges(&edges[i], &edges[i + 1]) {
                labels[i]
            } else {
                num_groups += 1;
                Some(num_groups - 1)
            };
        }

        if self.merges(&edges[n - 1], &edges[0]) {
            let tail = labels[n - 1];
            let mut j = n - 1;
            while j > 0 && labels[j - 1] == tail {
                j -= 1;
            }
            let head = labels[0];
            for label in &mut labels[j..] {
                *label = head;
            }
        }

        (labels, num_groups)
    }

    /// Label the hull edges and accumulate per-group length and direction.
    ///
    /// Groups whose arc length does not exceed `(width + height) / side_divisor`
    /// are marked as not retained; they are usually corner rounding noise.
    pub fn cluster(&self, edges: &[Edge], width: usize, height: usize) -> Result<Clustering> {
        let (labels, num_groups) = self.label(edges);

        let labelled = edges
            .iter()
            .zip(&labels)
            .enumerate()
            .map(|(index, (edge, label))| {
                label
                    .map(|g| edge.with_group(g))
                    .ok_or(Rect4Error::UnassignedEdge { index })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut groups = vec![EdgeGroup::default(); num_groups];
        for (index, edge) in labelled.iter().enumerate() {
            let group = edge.group.ok_or(Rect4Error::UnassignedEdge { index })?;
            let acc = groups.get_mut(group).ok_or(Rect4Error::GroupOutOfRange {
                index,
                group,
                num_groups,
            })?;
            let rad = edge.angle.to_radians();
            acc.arc_len += edge.length;
            acc.wx += edge.length * rad.cos();
            acc.wy += edge.length * rad.sin();
        }

        let min_side = ((width + height) / self.side_divisor.max(1)) as f64;
        for (i, group) in groups.iter_mut().enumerate() {
            group.retained = group.arc_len > min_side;
            if group.retained {
                group.avg_angle = group.wy.atan2(group.wx).to_degrees();
            }
            debug!(
                group = i,
                arc_len = group.arc_len,
                avg_angle = group.avg_angle,
                retained = group.retained,
                "edge group"
            );
        }

        debug!(
            edges = labelled.len(),
            groups = num_groups,
            retained = groups.iter().filter(|g| g.retained).count(),
            min_side,
            "clustered hull edges"
        );

        Ok(Clustering {
            edges: labelled,
            groups,
        })
    }
}
