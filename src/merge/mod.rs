pub mod merger;
pub mod union;

pub use merger::{BandMerger, retain_bands};
pub use union::{BooleanOpsUnion, PolygonUnion, collapse_to_multipolygon, with_quiet_panics};
