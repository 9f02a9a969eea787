//! reachmap - Facility reachability heatmaps, contour bands and merged isochrones

pub mod api;
pub mod config;
pub mod contour;
pub mod domain;
pub mod error;
pub mod feed;
pub mod field;
pub mod geometry;
pub mod merge;
pub mod output;
pub mod render;
