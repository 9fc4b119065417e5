//! # rect4
//!
//! Best-fit four-sided footprints for raster validity masks.
//!
//! The convex hull of the mask's set pixels is traced with a directional
//! sweep, near-collinear hull facets are clustered into dominant sides, and
//! the supporting lines of four sides are intersected into a quadrilateral.
//! An optional greedy refiner then nudges the corners toward better agreement
//! with the raw mask.
//!
//! ## Core Features
//!
//! - **Hull sweep**: integer-exact convex boundary of any [`MaskGrid`]
//! - **Edge clustering**: hull facets collapse into four logical sides
//! - **Scanline rasterizer**: polygons to per-row crossing lists and back to masks
//! - **Refinement**: seeded, reproducible local search scored against the mask
//! - **No-data classification**: build the mask from image samples
//! - **GeoJSON Support**: export footprints to standard GeoJSON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rect4::{NdvDef, Pipeline};
//!
//! let pipeline = Pipeline::builder().with_seed(7).build();
//!
//! let image = image::open("scene.tif")?;
//! let ndv = NdvDef::from_specs(&["0"], &[])?;
//! let result = pipeline.process_image(&image, &ndv)?;
//!
//! result.save_geojson("footprint.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod grid;
pub mod config;
pub mod algorithms;
pub mod pipeline;
pub mod io;
pub mod ndv;
pub mod debug;

pub use error::{Rect4Error, Result};
pub use types::{ComputedFootprint, Edge, EdgeGroup, Rect4Outcome, Ring, Vertex};
pub use traits::*;
pub use grid::BitGrid;
pub use config::Rect4Params;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use ndv::{NdvDef, NdvInterval, NdvSlab};
pub use debug::CanvasPlot;

/// Find the quadrilateral footprint of `mask` with default parameters.
///
/// Refinement, when enabled, uses the default seed so repeated calls agree.
pub fn find_rect4<M: MaskGrid + ?Sized>(mask: &M, refine: bool) -> Result<Rect4Outcome> {
    let pipeline = Pipeline::builder().with_refinement(refine).build();
    Ok(pipeline.process(mask)?.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn create_test_image() -> GrayImage {
        let mut img = GrayImage::new(100, 100);
        for y in 20..80 {
            for x in 20..80 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn test_find_rect4_on_gray_image() {
        let image = create_test_image();
        let outcome = find_rect4(&image, false).expect("Should process successfully");
        assert_eq!(
            outcome,
            Rect4Outcome::Quad(Ring::from_xy(&[(20.0, 20.0), (79.0, 20.0), (79.0, 79.0), (20.0, 79.0)]))
        );
    }

    #[test]
    fn test_pipeline_basic() {
        let pipeline = Pipeline::builder().with_iterations(1_000).build();
        let image = create_test_image();

        let result = pipeline.process(&image).expect("Should process successfully");
        assert!(result.outcome.is_quad());
        assert_eq!(result.image_width, 100);
        assert_eq!(result.image_height, 100);
    }

    #[test]
    fn test_geojson_export() {
        let image = create_test_image();
        let result = Pipeline::builder()
            .with_refinement(false)
            .build()
            .process(&image)
            .expect("Should process successfully");
        let geojson = result.to_geojson().expect("Should create GeoJSON");
        assert_eq!(geojson.features.len(), 1);
    }

    #[test]
    fn test_empty_mask_is_an_error() {
        let image = GrayImage::new(10, 10);
        assert!(matches!(find_rect4(&image, true), Err(Rect4Error::EmptyInput)));
    }
}
