pub mod writer;

pub use writer::{contour_features, merged_features, write_feature_collection};
