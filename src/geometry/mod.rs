pub mod containment;
pub mod distance;
pub mod extent;
pub mod simplify;

pub use containment::{point_in_polygon, point_in_ring};
pub use distance::{EARTH_RADIUS_KM, great_circle_distance};
pub use extent::{GeoBounds, GridExtent};
pub use simplify::{simplify_multipolygon, simplify_ring};
