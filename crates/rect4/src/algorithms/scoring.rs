use crate::{
    algorithms::raster::{row_crossings, ParityEvents},
    config::Rect4Params,
    traits::MaskGrid,
    types::Ring,
};

/// Relative oracle comparing two rings against a mask.
///
/// Only the symmetric difference of the two rings is visited. Pixels that
/// only the reference covers score `gain` if they are unset (the candidate
/// was right to drop them) and `-penalty` if set. Pixels that only the
/// candidate covers score `gain` if set and `-penalty` if unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryScorer {
    pub gain: i64,
    pub penalty: i64,
}

impl Default for BoundaryScorer {
    fn default() -> Self {
        Self { gain: 1, penalty: 2 }
    }
}

impl BoundaryScorer {
    pub fn from_params(params: &Rect4Params) -> Self {
        Self {
            gain: params.gain,
            penalty: params.penalty,
        }
    }

    /// Signed tally; positive means `candidate` agrees with the mask better than `reference`.
    pub fn score<M: MaskGrid + ?Sized>(&self, reference: &Ring, candidate: &Ring, mask: &M) -> i64 {
        let bbox = match (reference.bbox(), candidate.bbox()) {
            (Some(a), Some(b)) => a.union(&b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => return 0,
        };
        let min_y = bbox.min_y.floor() as i64;
        let max_y = bbox.max_y.ceil() as i64;
        let max_x = bbox.max_x.ceil() as i64;
        let num_rows = (max_y - min_y + 1) as usize;

        let ref_rows = row_crossings(std::slice::from_ref(reference), min_y, num_rows);
        let cand_rows = row_crossings(std::slice::from_ref(candidate), min_y, num_rows);

        let mut tally = 0;
        for (offset, (r1, r2)) in ref_rows.iter().zip(&cand_rows).enumerate() {
            let y = min_y + offset as i64;
            let mut events = ParityEvents::new(r1, r2).peekable();
            while let Some((x_from, in_ref, in_cand)) = events.next() {
                if in_ref == in_cand {
                    continue;
                }
                let x_to = events.peek().map_or(max_x + 1, |e| e.0);
                for x in x_from..x_to {
                    let set = mask.get(x, y);
                    tally += match (in_ref, set) {
                        (true, false) | (false, true) => self.gain,
                        (true, true) | (false, false) => -self.penalty,
                    };
                }
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BitGrid;

    fn square_mask() -> BitGrid {
        let mut mask = BitGrid::new(20, 20);
        mask.fill_rect(5, 5, 14, 14);
        mask
    }

    #[test]
    fn test_self_comparison_is_zero() {
        let mask = square_mask();
        let rings = [
            Ring::from_xy(&[(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)]),
            Ring::from_xy(&[(-3.0, 2.5), (30.0, 0.0), (18.2, 25.0), (1.0, 12.0)]),
            Ring::from_xy(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0)]),
        ];
        for ring in &rings {
            assert_eq!(BoundaryScorer::default().score(ring, ring, &mask), 0);
        }
    }

    #[test]
    fn test_growing_onto_valid_pixels_scores_gain() {
        let mask = square_mask();
        let hull = Ring::from_xy(&[(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)]);
        let exact = Ring::from_xy(&[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)]);
        // the hull misses column 14 and row 14: 19 valid pixels
        assert_eq!(BoundaryScorer::default().score(&hull, &exact, &mask), 19);
        assert_eq!(BoundaryScorer::default().score(&exact, &hull, &mask), -38);
    }

    #[test]
    fn test_covering_invalid_pixels_is_penalized() {
        let mask = square_mask();
        let exact = Ring::from_xy(&[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)]);
        let wide = Ring::from_xy(&[(5.0, 5.0), (16.0, 5.0), (16.0, 15.0), (5.0, 15.0)]);
        assert_eq!(BoundaryScorer::default().score(&exact, &wide, &mask), -20);
        // dropping those invalid pixels again is rewarded at the gain rate
        assert_eq!(BoundaryScorer::default().score(&wide, &exact, &mask), 10);
    }

    #[test]
    fn test_two_spans_in_one_row() {
        let mask = square_mask();
        let exact = Ring::from_xy(&[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)]);
        let wider = Ring::from_xy(&[(4.0, 5.0), (16.0, 5.0), (16.0, 15.0), (4.0, 15.0)]);
        // columns 4 and 15 on rows 5..=14, all unset
        assert_eq!(BoundaryScorer::default().score(&exact, &wider, &mask), -40);
        assert_eq!(BoundaryScorer::default().score(&wider, &exact, &mask), 20);
    }

    #[test]
    fn test_custom_weights() {
        let mask = square_mask();
        let hull = Ring::from_xy(&[(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)]);
        let exact = Ring::from_xy(&[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)]);
        let scorer = BoundaryScorer { gain: 3, penalty: 1 };
        assert_eq!(scorer.score(&hull, &exact, &mask), 57);
    }
}
