//! No-data classification of raster samples into a validity mask.
//!
//! A definition is a list of slabs; each slab holds one interval per band, or
//! a single interval shared by all bands. No-data definitions (`-ndv`) flag
//! samples inside any slab. Valid-range definitions flag samples outside every
//! slab. NaN samples are always no-data.

use std::str::FromStr;

use image::{DynamicImage, ImageBuffer, Pixel};
use tracing::debug;

use crate::{
    error::{Rect4Error, Result},
    grid::BitGrid,
};

/// Closed interval `[min, max]`; infinite bounds are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdvInterval {
    pub min: f64,
    pub max: f64,
}

impl NdvInterval {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn exact(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

fn parse_bound(s: &str, term: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| Rect4Error::NdvParse(format!("'{}' in [{}] is not a number", s, term)))
}

/// `"v"` or `"min..max"`
impl FromStr for NdvInterval {
    type Err = Rect4Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once("..") {
            Some((lo, hi)) => Ok(Self::new(parse_bound(lo, s)?, parse_bound(hi, s)?)),
            None => Ok(Self::exact(parse_bound(s, s)?)),
        }
    }
}

/// One interval per band
#[derive(Debug, Clone, PartialEq)]
pub struct NdvSlab {
    pub bands: Vec<NdvInterval>,
}

impl NdvSlab {
    fn interval_for(&self, band: usize) -> Option<&NdvInterval> {
        if self.bands.len() == 1 {
            self.bands.first()
        } else {
            self.bands.get(band)
        }
    }
}

/// Space separated intervals, e.g. `"0 0 0"` or `"-Inf..0 255"`
impl FromStr for NdvSlab {
    type Err = Rect4Error;

    fn from_str(s: &str) -> Result<Self> {
        let bands = s
            .split_whitespace()
            .map(NdvInterval::from_str)
            .collect::<Result<Vec<_>>>()?;
        if bands.is_empty() {
            return Err(Rect4Error::NdvParse(format!("could not parse given NDV term [{}]", s)));
        }
        Ok(Self { bands })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NdvDef {
    pub slabs: Vec<NdvSlab>,
    /// Slabs describe valid data rather than no-data
    pub invert: bool,
}

impl NdvDef {
    pub fn no_data(slabs: Vec<NdvSlab>) -> Self {
        Self { slabs, invert: false }
    }

    pub fn valid_range(slabs: Vec<NdvSlab>) -> Self {
        Self { slabs, invert: true }
    }

    /// Build from `-ndv` style and `-valid-range` style terms; at most one kind may be given
    pub fn from_specs<S: AsRef<str>>(ndv: &[S], valid: &[S]) -> Result<Self> {
        if !ndv.is_empty() && !valid.is_empty() {
            return Err(Rect4Error::NdvParse(
                "no-data values and valid ranges cannot be combined".into(),
            ));
        }
        let parse = |terms: &[S]| {
            terms
                .iter()
                .map(|t| t.as_ref().parse::<NdvSlab>())
                .collect::<Result<Vec<_>>>()
        };
        if valid.is_empty() {
            Ok(Self::no_data(parse(ndv)?))
        } else {
            Ok(Self::valid_range(parse(valid)?))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }

    /// Every slab must cover `bands` bands, either per band or with one shared interval
    pub fn check_bands(&self, bands: usize) -> Result<()> {
        for slab in &self.slabs {
            let defined = slab.bands.len();
            if defined != 1 && defined < bands {
                return Err(Rect4Error::NdvBandCount { defined, actual: bands });
            }
        }
        Ok(())
    }

    /// Whether `value` in `band` should be treated as no-data
    pub fn band_is_no_data(&self, band: usize, value: f64) -> Result<bool> {
        if value.is_nan() {
            return Ok(true);
        }
        let mut matched = false;
        for slab in &self.slabs {
            let interval = slab.interval_for(band).ok_or(Rect4Error::NdvBandCount {
                defined: slab.bands.len(),
                actual: band + 1,
            })?;
            matched |= interval.contains(value);
        }
        Ok(matched != self.invert)
    }

    /// Combine per-band flags into pixel validity.
    ///
    /// With no-data values a pixel is invalid only if every band is no-data.
    /// With valid ranges a single out-of-range band invalidates the pixel.
    pub fn pixel_is_valid(&self, samples: &[f64]) -> Result<bool> {
        let mut any_valid = false;
        let mut all_valid = true;
        for (band, &value) in samples.iter().enumerate() {
            let no_data = self.band_is_no_data(band, value)?;
            any_valid |= !no_data;
            all_valid &= !no_data;
        }
        Ok(if self.invert { all_valid } else { any_valid })
    }

    /// Validity mask of an image. Alpha channels are not treated as bands.
    pub fn classify_image(&self, image: &DynamicImage) -> Result<BitGrid> {
        match image {
            DynamicImage::ImageLuma8(buf) => self.classify_buffer(buf, 1),
            DynamicImage::ImageLumaA8(buf) => self.classify_buffer(buf, 1),
            DynamicImage::ImageRgb8(buf) => self.classify_buffer(buf, 3),
            DynamicImage::ImageRgba8(buf) => self.classify_buffer(buf, 3),
            DynamicImage::ImageLuma16(buf) => self.classify_buffer(buf, 1),
            DynamicImage::ImageLumaA16(buf) => self.classify_buffer(buf, 1),
            DynamicImage::ImageRgb16(buf) => self.classify_buffer(buf, 3),
            DynamicImage::ImageRgba16(buf) => self.classify_buffer(buf, 3),
            DynamicImage::ImageRgb32F(buf) => self.classify_buffer(buf, 3),
            DynamicImage::ImageRgba32F(buf) => self.classify_buffer(buf, 3),
            other => self.classify_buffer(&other.to_rgb32f(), 3),
        }
    }

    fn classify_buffer<P>(&self, buf: &ImageBuffer<P, Vec<P::Subpixel>>, bands: usize) -> Result<BitGrid>
    where
        P: Pixel,
        P::Subpixel: Into<f64>,
    {
        self.check_bands(bands)?;
        let (w, h) = buf.dimensions();
        let mut mask = BitGrid::new(w as usize, h as usize);
        let mut samples: Vec<f64> = Vec::with_capacity(bands);
        for (x, y, px) in buf.enumerate_pixels() {
            samples.clear();
            samples.extend(px.channels().iter().take(bands).map(|&c| c.into()));
            mask.set(x as usize, y as usize, self.pixel_is_valid(&samples)?);
        }
        debug!(width = w, height = h, bands, valid = mask.count_set(), "classified image");
        Ok(mask)
    }
}
