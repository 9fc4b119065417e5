use image::GrayImage;
use crate::types::Vertex;

/// Read-only boolean field over a raster.
///
/// Reads outside `0..width` x `0..height` are unset.
pub trait MaskGrid {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Whether pixel `(x, y)` is set. Out-of-bounds coordinates return `false`.
    fn get(&self, x: i64, y: i64) -> bool;

    /// Leftmost and rightmost set columns of row `y`, if any
    fn row_extent(&self, y: usize) -> Option<(usize, usize)> {
        let row = y as i64;
        let left = (0..self.width()).find(|&x| self.get(x as i64, row))?;
        let right = (left..self.width())
            .rev()
            .find(|&x| self.get(x as i64, row))
            .unwrap_or(left);
        Some((left, right))
    }
}

impl<M: MaskGrid + ?Sized> MaskGrid for &M {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn get(&self, x: i64, y: i64) -> bool {
        (**self).get(x, y)
    }

    fn row_extent(&self, y: usize) -> Option<(usize, usize)> {
        (**self).row_extent(y)
    }
}

/// Any non-zero luma value counts as set
impl MaskGrid for GrayImage {
    fn width(&self) -> usize {
        self.dimensions().0 as usize
    }

    fn height(&self) -> usize {
        self.dimensions().1 as usize
    }

    fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= MaskGrid::width(self) as i64 || y >= MaskGrid::height(self) as i64 {
            return false;
        }
        self.get_pixel(x as u32, y as u32)[0] != 0
    }
}

/// Sink for diagnostic drawing. Both methods default to no-ops.
pub trait DebugPlot {
    fn plot_point(&mut self, _p: Vertex, _color: [u8; 3]) {}

    fn plot_line(&mut self, _from: Vertex, _to: Vertex, _color: [u8; 3]) {}

    /// Draw a closed ring with its corners highlighted
    fn plot_ring(&mut self, pts: &[Vertex], line: [u8; 3], corner: [u8; 3]) {
        let n = pts.len();
        for i in 0..n {
            let j = (i + 1) % n;
            self.plot_line(pts[i], pts[j], line);
        }
        for &p in pts {
            self.plot_point(p, corner);
        }
    }
}

/// Debug sink that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlot;

impl DebugPlot for NoopPlot {}
