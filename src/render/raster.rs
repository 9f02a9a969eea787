use std::path::Path;

use anyhow::{Context, Result, bail};
use image::{Rgba, RgbaImage};

use super::ColorMapper;
use crate::field::SampleGrid;

/// Paint a grid through `mapper`; cells outside the boundary stay transparent
pub fn rasterize(grid: &SampleGrid, mapper: &dyn ColorMapper) -> RgbaImage {
    RgbaImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        match grid.get(x as usize, y as usize) {
            Some(v) => Rgba(mapper.color(v)),
            None => Rgba([0, 0, 0, 0]),
        }
    })
}

/// Write an RGBA image as PNG
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        bail!("Refusing to write an empty {}x{} image", image.width(), image.height());
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::BandColorMapper;
    use tempfile::tempdir;

    #[test]
    fn test_rasterize_transparent_outside() {
        let grid = SampleGrid::new(2, 1, vec![Some(10.0), None]);
        let image = rasterize(&grid, &BandColorMapper::heatmap());

        assert_eq!(image.get_pixel(0, 0).0, [0, 100, 0, 242]);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
    }

    #[test]
    fn test_write_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let grid = SampleGrid::new(3, 2, vec![Some(1.0); 6]);

        write_png(&path, &rasterize(&grid, &BandColorMapper::heatmap())).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_empty_png_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        let grid = SampleGrid::new(0, 0, vec![]);
        assert!(write_png(&path, &rasterize(&grid, &BandColorMapper::heatmap())).is_err());
    }
}
