use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::{error::Result, traits::{DebugPlot, MaskGrid}, types::Vertex};

const MASK_GRAY: u8 = 96;
const POINT_RADIUS: i32 = 2;

/// Debug sink that draws onto an RGB canvas the size of the mask.
#[derive(Debug, Clone)]
pub struct CanvasPlot {
    canvas: RgbImage,
}

impl CanvasPlot {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbImage::new(width, height),
        }
    }

    /// Start from the mask itself, set pixels in gray
    pub fn from_mask<M: MaskGrid + ?Sized>(mask: &M) -> Self {
        let canvas = RgbImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
            if mask.get(x as i64, y as i64) {
                Rgb([MASK_GRAY; 3])
            } else {
                Rgb([0; 3])
            }
        });
        Self { canvas }
    }

    pub fn image(&self) -> &RgbImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbImage {
        self.canvas
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.canvas.save(path)?;
        Ok(())
    }
}

impl DebugPlot for CanvasPlot {
    fn plot_point(&mut self, p: Vertex, color: [u8; 3]) {
        let center = (p.x.round() as i32, p.y.round() as i32);
        draw_filled_circle_mut(&mut self.canvas, center, POINT_RADIUS, Rgb(color));
    }

    fn plot_line(&mut self, from: Vertex, to: Vertex, color: [u8; 3]) {
        draw_line_segment_mut(
            &mut self.canvas,
            (from.x as f32, from.y as f32),
            (to.x as f32, to.y as f32),
            Rgb(color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BitGrid;
    use geo_types::Coord;

    #[test]
    fn test_canvas_draws_over_mask() {
        let mut mask = BitGrid::new(16, 16);
        mask.fill_rect(4, 4, 11, 11);
        let mut plot = CanvasPlot::from_mask(&mask);
        assert_eq!(*plot.image().get_pixel(5, 5), Rgb([MASK_GRAY; 3]));

        plot.plot_line(Coord { x: 0.0, y: 0.0 }, Coord { x: 15.0, y: 0.0 }, [255, 0, 0]);
        plot.plot_point(Coord { x: 8.0, y: 8.0 }, [255, 255, 0]);

        let image = plot.into_image();
        assert_eq!(*image.get_pixel(7, 0), Rgb([255, 0, 0]));
        assert_eq!(*image.get_pixel(8, 8), Rgb([255, 255, 0]));
        assert_eq!(*image.get_pixel(0, 15), Rgb([0, 0, 0]));
    }
}
