use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a figure could not be put on screen.
#[derive(Error, Debug)]
pub enum FigureError {
    #[error("Image not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot fit {path} ({width}x{height}) into {box_w}x{box_h}")]
    Resize {
        path: PathBuf,
        width: u32,
        height: u32,
        box_w: u32,
        box_h: u32,
    },
}

/// A decoded figure kept around so it can be rescaled without touching disk again.
pub struct Figure {
    pub path: PathBuf,
    image: DynamicImage,
}

impl Figure {
    pub fn open(path: &Path) -> Result<Figure, FigureError> {
        let reader = image::io::Reader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => FigureError::NotFound(path.to_path_buf()),
                _ => FigureError::Unreadable { path: path.to_path_buf(), source: e },
            })?;
        let image = reader.decode().map_err(|e| FigureError::Decode {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Figure { path: path.to_path_buf(), image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// RGBA copy scaled to fit inside `bounds`, keeping the aspect ratio.
    pub fn scaled(&self, bounds: (u32, u32)) -> Result<RgbaImage, FigureError> {
        let (w, h) = self.dimensions();
        let (nw, nh) = fit_within((w, h), bounds).ok_or_else(|| FigureError::Resize {
            path: self.path.clone(),
            width: w,
            height: h,
            box_w: bounds.0,
            box_h: bounds.1,
        })?;
        if (nw, nh) == (w, h) {
            return Ok(self.image.to_rgba8());
        }
        Ok(self.image.resize_exact(nw, nh, FilterType::Lanczos3).to_rgba8())
    }
}

/// Largest size with the aspect of `size` that fits in `bounds`, truncated to whole pixels.
pub fn fit_within(size: (u32, u32), bounds: (u32, u32)) -> Option<(u32, u32)> {
    let (w, h) = size;
    let (bw, bh) = bounds;
    if w == 0 || h == 0 || bw == 0 || bh == 0 {
        return None;
    }
    let scale = (bw as f64 / w as f64).min(bh as f64 / h as f64);
    let nw = (w as f64 * scale) as u32;
    let nh = (h as f64 * scale) as u32;
    if nw == 0 || nh == 0 {
        return None;
    }
    Some((nw, nh))
}

pub fn to_color_image(rgba: &RgbaImage) -> egui::ColorImage {
    let size = [rgba.width() as usize, rgba.height() as usize];
    egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs;

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(fit_within((200, 100), (1000, 1800)), Some((1000, 500)));
        assert_eq!(fit_within((200, 100), (100, 100)), Some((100, 50)));
        assert_eq!(fit_within((300, 300), (900, 450)), Some((450, 450)));
        assert_eq!(fit_within((10, 10), (0, 100)), None);
        assert_eq!(fit_within((1000, 1), (10, 10)), None);
    }

    #[test]
    fn open_and_scale_png() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("lc.png");
        RgbImage::from_pixel(40, 20, Rgb([10, 20, 30])).save(&p).unwrap();

        let fig = Figure::open(&p).unwrap();
        assert_eq!(fig.dimensions(), (40, 20));
        let small = fig.scaled((10, 10)).unwrap();
        assert_eq!(small.dimensions(), (10, 5));
        let color = to_color_image(&small);
        assert_eq!(color.size, [10, 5]);
    }

    #[test]
    fn failures_are_typed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("gone.jpg");
        assert!(matches!(Figure::open(&missing), Err(FigureError::NotFound(_))));

        let junk = dir.path().join("junk.jpg");
        fs::write(&junk, b"definitely not a jpeg").unwrap();
        assert!(matches!(Figure::open(&junk), Err(FigureError::Decode { .. })));

        let p = dir.path().join("ok.png");
        RgbImage::new(4, 4).save(&p).unwrap();
        let fig = Figure::open(&p).unwrap();
        assert!(matches!(fig.scaled((0, 0)), Err(FigureError::Resize { .. })));
    }
}
