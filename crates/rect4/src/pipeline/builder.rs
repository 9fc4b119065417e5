use crate::{config::Rect4Params, pipeline::Pipeline};

pub const DEFAULT_SEED: u64 = 0;

/// Builder for [`Pipeline`] with a fluent API
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    params: Rect4Params,
    refine: bool,
    seed: u64,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            params: Rect4Params::default(),
            refine: true,
            seed: DEFAULT_SEED,
        }
    }

    /// Replace all tuning constants
    pub fn with_params(mut self, params: Rect4Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_refinement(mut self, refine: bool) -> Self {
        self.refine = refine;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.params.iterations = iterations;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline::new(self.params, self.refine, self.seed)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pipeline = PipelineBuilder::default().build();
        assert!(pipeline.refines());
        assert_eq!(pipeline.seed(), DEFAULT_SEED);
        assert_eq!(pipeline.params(), &Rect4Params::default());
    }

    #[test]
    fn test_iterations_override_params() {
        let params = Rect4Params {
            iterations: 10,
            ..Rect4Params::default()
        };
        let pipeline = PipelineBuilder::new()
            .with_params(params)
            .with_iterations(25)
            .with_seed(9)
            .build();
        assert_eq!(pipeline.params().iterations, 25);
        assert_eq!(pipeline.seed(), 9);
    }
}
