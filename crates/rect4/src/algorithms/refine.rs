use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::{
    algorithms::scoring::BoundaryScorer,
    config::Rect4Params,
    error::{Rect4Error, Result},
    traits::MaskGrid,
    types::Ring,
};

/// Summary of one refinement run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineStats {
    pub iterations: usize,
    /// Candidates that replaced the current best
    pub accepted: usize,
    /// Sum of the tallies of accepted candidates
    pub total_gain: i64,
}

/// Greedy local search over parallelogram-shaped quadrilaterals.
///
/// Each iteration jitters three corners by up to `amt` pixels per axis and
/// rebuilds the fourth as `p0 + p2 - p1`. The candidate replaces the current
/// best only when the scorer reports a strictly positive tally, and `amt`
/// decays exponentially with the iteration count. Worse candidates are never
/// accepted.
#[derive(Debug, Clone)]
pub struct AnnealingRefiner {
    pub scorer: BoundaryScorer,
    pub initial_step: f64,
    pub step_decay: f64,
    pub iterations: usize,
}

impl Default for AnnealingRefiner {
    fn default() -> Self {
        Self::from_params(&Rect4Params::default())
    }
}

impl AnnealingRefiner {
    pub fn from_params(params: &Rect4Params) -> Self {
        Self {
            scorer: BoundaryScorer::from_params(params),
            initial_step: params.initial_step,
            step_decay: params.step_decay,
            iterations: params.iterations,
        }
    }

    /// Perturbation magnitude for `iteration`, never below 1 while `initial_step` is positive
    /// and never negative
    pub fn step_size(&self, iteration: usize) -> i64 {
        ((self.initial_step * (-(iteration as f64) / self.step_decay).exp()).ceil() as i64).max(0)
    }

    /// Jitter the first three corners of a quadrilateral by up to `amt` per axis
    pub fn perturb<R: Rng + ?Sized>(&self, ring: &Ring, amt: i64, rng: &mut R) -> Result<Ring> {
        let mut pts = match ring.pts.as_slice() {
            [p0, p1, p2, _] => [*p0, *p1, *p2],
            _ => return Err(Rect4Error::InvalidRing { vertices: ring.len() }),
        };
        let amt = amt.max(0);
        for p in pts.iter_mut() {
            p.x += rng.gen_range(-amt..=amt) as f64;
            p.y += rng.gen_range(-amt..=amt) as f64;
        }
        let [p0, p1, p2] = pts;
        Ok(Ring::new(vec![p0, p1, p2, p0 + p2 - p1]))
    }

    pub fn refine<M, R>(&self, input: &Ring, mask: &M, rng: &mut R) -> Result<(Ring, RefineStats)>
    where
        M: MaskGrid + ?Sized,
        R: Rng + ?Sized,
    {
        if input.len() != 4 {
            return Err(Rect4Error::InvalidRing { vertices: input.len() });
        }

        let mut best = input.clone();
        let mut stats = RefineStats {
            iterations: self.iterations,
            ..RefineStats::default()
        };

        for iteration in 0..self.iterations {
            let amt = self.step_size(iteration);
            let candidate = self.perturb(&best, amt, rng)?;
            let tally = self.scorer.score(&best, &candidate, mask);
            if tally > 0 {
                trace!(iteration, amt, tally, "accepted candidate");
                best = candidate;
                stats.accepted += 1;
                stats.total_gain += tally;
            }
        }

        info!(
            iterations = stats.iterations,
            accepted = stats.accepted,
            total_gain = stats.total_gain,
            "refinement finished"
        );
        Ok((best, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BitGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square_mask() -> BitGrid {
        let mut mask = BitGrid::new(20, 20);
        mask.fill_rect(5, 5, 14, 14);
        mask
    }

    fn hull_quad() -> Ring {
        Ring::from_xy(&[(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)])
    }

    #[test]
    fn test_step_size_decays_to_one() {
        let refiner = AnnealingRefiner::default();
        assert_eq!(refiner.step_size(0), 200);
        assert_eq!(refiner.step_size(50), 74);
        assert!((1..400).all(|i| refiner.step_size(i) <= refiner.step_size(i - 1)));
        assert_eq!(refiner.step_size(400), 1);
        assert_eq!(refiner.step_size(9_999), 1);
    }

    #[test]
    fn test_perturb_keeps_parallelogram() {
        let refiner = AnnealingRefiner::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ring = hull_quad();
        for amt in [0, 1, 5, 40] {
            let moved = refiner.perturb(&ring, amt, &mut rng).unwrap();
            let [p0, p1, p2, p3] = [moved.pts[0], moved.pts[1], moved.pts[2], moved.pts[3]];
            assert_eq!(p3, p0 + p2 - p1);
            for (a, b) in ring.pts.iter().zip(&moved.pts).take(3) {
                assert!((a.x - b.x).abs() <= amt as f64 && (a.y - b.y).abs() <= amt as f64);
            }
        }
    }

    #[test]
    fn test_refinement_is_reproducible() {
        let mask = square_mask();
        let refiner = AnnealingRefiner {
            iterations: 600,
            ..AnnealingRefiner::default()
        };
        let (a, stats_a) = refiner.refine(&hull_quad(), &mask, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let (b, stats_b) = refiner.refine(&hull_quad(), &mask, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
        assert_eq!(stats_a, stats_b);
    }

    #[test]
    fn test_each_iteration_only_improves() {
        // Runs sharing a seed consume the same random stream, so run k+1
        // either repeats run k or replaced it with a strictly better ring.
        let mask = square_mask();
        let scorer = BoundaryScorer::default();
        let mut previous = hull_quad();
        for k in 1..=60 {
            let refiner = AnnealingRefiner {
                iterations: k,
                ..AnnealingRefiner::default()
            };
            let (ring, _) = refiner
                .refine(&hull_quad(), &mask, &mut ChaCha8Rng::seed_from_u64(3))
                .unwrap();
            if ring != previous {
                assert!(scorer.score(&previous, &ring, &mask) > 0, "iteration {} regressed", k);
            }
            previous = ring;
        }
    }

    #[test]
    fn test_rejects_non_quadrilateral() {
        let triangle = Ring::from_xy(&[(0.0, 0.0), (4.0, 0.0), (0.0, 4.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = AnnealingRefiner::default().refine(&triangle, &square_mask(), &mut rng);
        assert!(matches!(result, Err(Rect4Error::InvalidRing { vertices: 3 })));
        let moved = AnnealingRefiner::default().perturb(&triangle, 5, &mut rng);
        assert!(matches!(moved, Err(Rect4Error::InvalidRing { vertices: 3 })));
    }

    #[test]
    fn test_negative_step_never_moves_corners() {
        let refiner = AnnealingRefiner {
            initial_step: -10.0,
            iterations: 50,
            ..AnnealingRefiner::default()
        };
        assert_eq!(refiner.step_size(0), 0);
        let (ring, stats) = refiner
            .refine(&hull_quad(), &square_mask(), &mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();
        assert_eq!(ring, hull_quad());
        assert_eq!(stats.accepted, 0);
    }
}
