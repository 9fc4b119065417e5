use image::{GrayImage, Luma};

use crate::traits::MaskGrid;

/// Dense boolean raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitGrid {
    /// All-unset grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.bits[y * width + x] = f(x, y);
            }
        }
        grid
    }

    /// Pixels at or above `threshold` are set
    pub fn from_luma(image: &GrayImage, threshold: u8) -> Self {
        let (w, h) = image.dimensions();
        Self::from_fn(w as usize, h as usize, |x, y| {
            image.get_pixel(x as u32, y as u32)[0] >= threshold
        })
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.bits[y * self.width + x] = value;
        }
    }

    /// Set every pixel in the inclusive rectangle `(x0, y0)..=(x1, y1)`
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) {
        for y in y0..=y1.min(self.height.saturating_sub(1)) {
            for x in x0..=x1.min(self.width.saturating_sub(1)) {
                self.bits[y * self.width + x] = true;
            }
        }
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Render as a black/white image (set = 255)
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([if self.bits[y as usize * self.width + x as usize] { 255 } else { 0 }])
        })
    }
}

impl MaskGrid for BitGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    fn row_extent(&self, y: usize) -> Option<(usize, usize)> {
        let row = self.bits.get(y * self.width..(y + 1) * self.width)?;
        let left = row.iter().position(|&b| b)?;
        let right = row.iter().rposition(|&b| b)?;
        Some((left, right))
    }
}
