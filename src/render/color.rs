use crate::domain::DistanceBands;
use crate::error::{PipelineError, Result};

/// Maps a defined scalar to an RGBA color
pub trait ColorMapper: Sync {
    fn color(&self, value: f64) -> [u8; 4];
}

/// Heatmap stops: upper bound (km) and color, green through red at 95% opacity
pub const HEATMAP_STOPS: [(f64, [u8; 4]); 5] = [
    (15.0, [0, 100, 0, 242]),
    (30.0, [102, 205, 102, 242]),
    (45.0, [255, 255, 0, 242]),
    (60.0, [255, 165, 0, 242]),
    (75.0, [255, 0, 0, 242]),
];

/// One flat color per band; values past the last bound take the last color
#[derive(Debug, Clone)]
pub struct BandColorMapper {
    bands: DistanceBands,
    colors: Vec<[u8; 4]>,
}

impl BandColorMapper {
    pub fn new(bands: DistanceBands, colors: Vec<[u8; 4]>) -> Result<Self> {
        if colors.len() != bands.len() {
            return Err(PipelineError::invalid(format!(
                "{} colors given for {} bands",
                colors.len(),
                bands.len()
            )));
        }
        Ok(Self { bands, colors })
    }

    pub fn heatmap() -> Self {
        let bounds: Vec<f64> = HEATMAP_STOPS.iter().map(|(upper, _)| *upper).collect();
        let colors = HEATMAP_STOPS.iter().map(|(_, color)| *color).collect();
        Self {
            bands: DistanceBands::from_bounds(&bounds)
                .unwrap_or_else(|_| unreachable!("heatmap stops are strictly increasing")),
            colors,
        }
    }

    pub fn bands(&self) -> &DistanceBands {
        &self.bands
    }
}

impl ColorMapper for BandColorMapper {
    fn color(&self, value: f64) -> [u8; 4] {
        self.colors[self.bands.classify(value)]
    }
}

/// Linear blend between two colors over `[min, max]`, clamped at both ends
#[derive(Debug, Clone, Copy)]
pub struct RampColorMapper {
    pub min: f64,
    pub max: f64,
    pub from: [u8; 4],
    pub to: [u8; 4],
}

impl ColorMapper for RampColorMapper {
    fn color(&self, value: f64) -> [u8; 4] {
        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = self.from[i] as f64;
            let b = self.to[i] as f64;
            *channel = (a + (b - a) * t).round() as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heatmap_stops() {
        let mapper = BandColorMapper::heatmap();
        assert_eq!(mapper.color(0.0), [0, 100, 0, 242]);
        assert_eq!(mapper.color(15.0), [0, 100, 0, 242]);
        assert_eq!(mapper.color(40.0), [255, 255, 0, 242]);
        assert_eq!(mapper.color(300.0), [255, 0, 0, 242]);
    }

    #[test]
    fn test_color_count_must_match() {
        let bands = DistanceBands::from_bounds(&[10.0, 20.0]).unwrap();
        assert!(BandColorMapper::new(bands, vec![[0, 0, 0, 255]]).is_err());
    }

    #[test]
    fn test_ramp() {
        let ramp = RampColorMapper {
            min: 0.0,
            max: 100.0,
            from: [0, 0, 0, 255],
            to: [200, 100, 0, 255],
        };
        assert_eq!(ramp.color(-5.0), [0, 0, 0, 255]);
        assert_eq!(ramp.color(50.0), [100, 50, 0, 255]);
        assert_eq!(ramp.color(150.0), [200, 100, 0, 255]);
    }
}
