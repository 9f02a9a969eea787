pub mod geojson;
pub mod parser;

pub use geojson::{Feature, FeatureCollection, GeoJson, GeometryJson};
pub use parser::{
    load_boundary, load_facilities, load_isochrones, parse_boundary, parse_facilities,
    parse_isochrones,
};
