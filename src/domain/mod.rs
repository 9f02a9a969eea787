pub mod band;
pub mod boundary;
pub mod facility;
pub mod isochrone;

pub use band::{Band, DistanceBands};
pub use boundary::BoundaryPolygon;
pub use facility::{Facility, FacilityKind, validate_facilities};
pub use isochrone::{Isochrone, MergedBandPolygon, SECONDS_PER_MINUTE, minutes_to_seconds};
