pub mod builder;

use image::DynamicImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    algorithms::{AnnealingRefiner, ConvexBoundaryWalker, EdgeClusterer, QuadrilateralSynthesizer},
    config::Rect4Params,
    error::Result,
    ndv::NdvDef,
    traits::{DebugPlot, MaskGrid, NoopPlot},
    types::{ComputedFootprint, Rect4Outcome},
};

pub(crate) const REFINED_COLOR: [u8; 3] = [0, 255, 0];
pub(crate) const REFINED_CORNER_COLOR: [u8; 3] = [255, 255, 0];

/// Mask to quadrilateral: hull sweep, edge clustering, synthesis and optional refinement.
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: Rect4Params,
    refine: bool,
    seed: u64,
}

impl Pipeline {
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    pub fn new(params: Rect4Params, refine: bool, seed: u64) -> Self {
        Self { params, refine, seed }
    }

    pub fn params(&self) -> &Rect4Params {
        &self.params
    }

    pub fn refines(&self) -> bool {
        self.refine
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run with the configured seed and no debug output
    pub fn process<M: MaskGrid + ?Sized>(&self, mask: &M) -> Result<ComputedFootprint> {
        self.process_plotted(mask, &mut NoopPlot)
    }

    /// Run with the configured seed, drawing each stage onto `plot`
    pub fn process_plotted<M: MaskGrid + ?Sized>(&self, mask: &M, plot: &mut dyn DebugPlot) -> Result<ComputedFootprint> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.process_with(mask, plot, &mut rng)
    }

    /// Classify `image` with `ndv` and run on the resulting validity mask
    pub fn process_image(&self, image: &DynamicImage, ndv: &NdvDef) -> Result<ComputedFootprint> {
        let mask = ndv.classify_image(image)?;
        self.process(&mask)
    }

    pub fn process_with<M, R>(&self, mask: &M, plot: &mut dyn DebugPlot, rng: &mut R) -> Result<ComputedFootprint>
    where
        M: MaskGrid + ?Sized,
        R: Rng + ?Sized,
    {
        self.params.validate()?;
        let (width, height) = (mask.width(), mask.height());

        let edges = ConvexBoundaryWalker.walk(mask, plot)?;
        debug!(edges = edges.len(), "hull traced");

        let clustering = EdgeClusterer::from_params(&self.params).cluster(&edges, width, height)?;
        debug!(
            groups = clustering.groups.len(),
            retained = clustering.retained().count(),
            "edges clustered"
        );

        let outcome = QuadrilateralSynthesizer.synthesize(&clustering, plot)?;
        let initial = outcome.ring().cloned();

        let (outcome, refine_stats) = match outcome {
            Rect4Outcome::Quad(ring) if self.refine => {
                let (refined, stats) = AnnealingRefiner::from_params(&self.params).refine(&ring, mask, rng)?;
                plot.plot_ring(&refined.pts, REFINED_COLOR, REFINED_CORNER_COLOR);
                (Rect4Outcome::Quad(refined), Some(stats))
            }
            other => (other, None),
        };

        if let Some(ring) = outcome.ring() {
            info!(area = ring.area(), perimeter = ring.perimeter(), "found quadrilateral");
        }

        Ok(ComputedFootprint {
            outcome,
            initial,
            refine_stats,
            image_width: width,
            image_height: height,
        })
    }

    pub fn info(&self) -> String {
        format!(
            "Pipeline: refinement {} ({} iterations, seed {}), merge ratio {}, merge angle {} deg",
            if self.refine { "on" } else { "off" },
            self.params.iterations,
            self.seed,
            self.params.merge_length_ratio,
            self.params.merge_max_angle_deg,
        )
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        builder::PipelineBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{debug::CanvasPlot, grid::BitGrid, types::Ring};

    fn square_mask() -> BitGrid {
        let mut mask = BitGrid::new(20, 20);
        mask.fill_rect(5, 5, 14, 14);
        mask
    }

    #[test]
    fn test_without_refinement_returns_hull_quad() {
        let pipeline = Pipeline::builder().with_refinement(false).build();
        let result = pipeline.process(&square_mask()).unwrap();
        let expected = Ring::from_xy(&[(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)]);
        assert_eq!(result.outcome, Rect4Outcome::Quad(expected.clone()));
        assert_eq!(result.initial, Some(expected));
        assert!(result.refine_stats.is_none());
        assert_eq!((result.image_width, result.image_height), (20, 20));
    }

    #[test]
    fn test_same_seed_same_result() {
        let pipeline = Pipeline::builder().with_seed(42).with_iterations(500).build();
        let a = pipeline.process(&square_mask()).unwrap();
        let b = pipeline.process(&square_mask()).unwrap();
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.refine_stats, b.refine_stats);
        assert_eq!(a.refine_stats.map(|s| s.iterations), Some(500));
    }

    #[test]
    fn test_debug_plot_receives_drawing() {
        let mask = square_mask();
        let mut plot = CanvasPlot::new(20, 20);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        Pipeline::builder()
            .with_iterations(50)
            .build()
            .process_with(&mask, &mut plot, &mut rng)
            .unwrap();
        assert!(plot.image().pixels().any(|p| p.0 != [0, 0, 0]));

        let mut seeded = CanvasPlot::new(20, 20);
        let pipeline = Pipeline::builder().with_iterations(50).build();
        let plotted = pipeline.process_plotted(&mask, &mut seeded).unwrap();
        assert_eq!(plotted.outcome, pipeline.process(&mask).unwrap().outcome);
    }

    #[test]
    fn test_process_image_with_ndv() {
        let mut img = image::GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, image::Luma([200]));
            }
        }
        let ndv = NdvDef::from_specs::<&str>(&["0"], &[]).unwrap();
        let result = Pipeline::builder()
            .with_refinement(false)
            .build()
            .process_image(&DynamicImage::ImageLuma8(img), &ndv)
            .unwrap();
        assert!(result.outcome.is_quad());
    }

    #[test]
    fn test_unvalidated_params_are_rejected() {
        let params = Rect4Params {
            side_divisor: 0,
            ..Rect4Params::default()
        };
        let pipeline = Pipeline::builder().with_params(params).build();
        assert!(matches!(
            pipeline.process(&square_mask()),
            Err(crate::error::Rect4Error::Config(_))
        ));

        let negative = Rect4Params {
            initial_step: -10.0,
            ..Rect4Params::default()
        };
        assert!(Pipeline::new(negative, true, 0).process(&square_mask()).is_err());
    }

    #[test]
    fn test_info_mentions_refinement() {
        let pipeline = Pipeline::builder().with_refinement(false).build();
        assert!(pipeline.info().contains("refinement off"));
    }
}
