pub mod builder;
pub mod grid;

pub use builder::{
    CellMapper, DistanceField, GridStats, MIN_BAND_SAMPLES, WindowStats, build_distance_field,
};
pub use grid::SampleGrid;
