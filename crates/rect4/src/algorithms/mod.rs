pub mod hull;
pub mod clustering;
pub mod synthesis;
pub mod raster;
pub mod scoring;
pub mod refine;

pub use hull::*;
pub use clustering::*;
pub use synthesis::*;
pub use raster::*;
pub use scoring::*;
pub use refine::*;
