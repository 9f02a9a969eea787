pub mod color;
pub mod raster;

pub use color::{BandColorMapper, ColorMapper, RampColorMapper};
pub use raster::{rasterize, write_png};
