pub mod openroute;

pub use openroute::{batch_locations, fetch_isochrones};
