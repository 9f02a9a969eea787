use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rayon::prelude::*;

use super::rings::assemble_polygons;
use super::{ContourExtractor, ContourPolygon};
use crate::field::SampleGrid;

/// A grid edge between two neighbouring samples.
///
/// `H(x, y)` joins (x, y)-(x+1, y); `V(x, y)` joins (x, y)-(x, y+1). Indices
/// run one past the grid on every side so rings close along the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    H(i64, i64),
    V(i64, i64),
}

impl Edge {
    fn endpoints(self) -> ((i64, i64), (i64, i64)) {
        match self {
            Edge::H(x, y) => ((x, y), (x + 1, y)),
            Edge::V(x, y) => ((x, y), (x, y + 1)),
        }
    }
}

/// Marching-squares contour extractor.
///
/// A sample is inside a threshold's region when it is defined and `<=` the
/// threshold. Samples outside the boundary (and beyond the grid frame) count
/// as outside, and an edge touching one gets its vertex at the edge midpoint
/// instead of an interpolated position. Ambiguous saddle cells are resolved
/// with the mean of their four corners. Thresholds are independent and are
/// traced in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarchingSquares;

impl ContourExtractor for MarchingSquares {
    fn extract(&self, grid: &SampleGrid, thresholds: &[f64]) -> Vec<ContourPolygon> {
        thresholds
            .par_iter()
            .map(|&threshold| {
                if !threshold.is_finite() {
                    warn!("Skipping non-finite contour threshold {}", threshold);
                    return Vec::new();
                }
                let rings = trace_rings(grid, threshold);
                let polygons = assemble_polygons(rings);
                debug!(
                    "Threshold {}: {} contour polygons",
                    threshold,
                    polygons.len()
                );
                polygons
                    .into_iter()
                    .map(|polygon| ContourPolygon { threshold, polygon })
                    .collect()
            })
            .collect::<Vec<Vec<ContourPolygon>>>()
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Oriented segments of one cell, each running with the inside region on its
/// right (x right, y down)
fn cell_segments(grid: &SampleGrid, x: i64, y: i64, threshold: f64) -> Vec<(Edge, Edge)> {
    let a = grid.get_signed(x, y);
    let b = grid.get_signed(x + 1, y);
    let c = grid.get_signed(x + 1, y + 1);
    let d = grid.get_signed(x, y + 1);

    let inside = |v: Option<f64>| v.is_some_and(|v| v <= threshold);
    let case = (inside(a) as u8) << 3 | (inside(b) as u8) << 2 | (inside(c) as u8) << 1 | inside(d) as u8;

    let top = Edge::H(x, y);
    let right = Edge::V(x + 1, y);
    let bottom = Edge::H(x, y + 1);
    let left = Edge::V(x, y);

    let center_inside = || match (a, b, c, d) {
        (Some(a), Some(b), Some(c), Some(d)) => (a + b + c + d) / 4.0 <= threshold,
        _ => false,
    };

    match case {
        0 | 15 => vec![],
        8 => vec![(top, left)],
        4 => vec![(right, top)],
        2 => vec![(bottom, right)],
        1 => vec![(left, bottom)],
        7 => vec![(left, top)],
        11 => vec![(top, right)],
        13 => vec![(right, bottom)],
        14 => vec![(bottom, left)],
        12 => vec![(right, left)],
        6 => vec![(bottom, top)],
        3 => vec![(left, right)],
        9 => vec![(top, bottom)],
        10 => {
            if center_inside() {
                vec![(top, right), (bottom, left)]
            } else {
                vec![(top, left), (bottom, right)]
            }
        }
        5 => {
            if center_inside() {
                vec![(left, top), (right, bottom)]
            } else {
                vec![(right, top), (left, bottom)]
            }
        }
        _ => unreachable!("marching squares case is a 4-bit value"),
    }
}

/// Position of the threshold crossing on `edge`, in grid coordinates
fn crossing_point(grid: &SampleGrid, edge: Edge, threshold: f64) -> (f64, f64) {
    let ((x0, y0), (x1, y1)) = edge.endpoints();
    let t = match (grid.get_signed(x0, y0), grid.get_signed(x1, y1)) {
        (Some(v0), Some(v1)) if v0 != v1 => ((threshold - v0) / (v1 - v0)).clamp(0.0, 1.0),
        // No data on one side: never interpolate across it
        _ => 0.5,
    };
    (
        x0 as f64 + t * (x1 - x0) as f64,
        y0 as f64 + t * (y1 - y0) as f64,
    )
}

/// Trace every closed ring of one threshold.
///
/// Each crossed edge is the end of exactly one segment and the start of
/// exactly one other, so following `start -> end` links always returns to
/// the starting edge. Rings come back closed (first vertex repeated).
pub(crate) fn trace_rings(grid: &SampleGrid, threshold: f64) -> Vec<Vec<(f64, f64)>> {
    let width = grid.width() as i64;
    let height = grid.height() as i64;

    let mut order = Vec::new();
    let mut next = HashMap::new();
    for y in -1..height {
        for x in -1..width {
            for (start, end) in cell_segments(grid, x, y, threshold) {
                order.push(start);
                next.insert(start, end);
            }
        }
    }

    let mut visited = HashSet::with_capacity(order.len());
    let mut rings = Vec::new();
    for start in order {
        if visited.contains(&start) {
            continue;
        }

        let mut ring: Vec<(f64, f64)> = Vec::new();
        let mut edge = start;
        while visited.insert(edge) {
            let point = crossing_point(grid, edge, threshold);
            if ring.last() != Some(&point) {
                ring.push(point);
            }
            match next.get(&edge) {
                Some(&following) => edge = following,
                None => break,
            }
        }

        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if let Some(&first) = ring.first() {
            ring.push(first);
            rings.push(ring);
        }
    }

    rings
}
