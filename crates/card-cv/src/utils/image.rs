//! Conversions between `image` buffers and OpenCV matrices

use crate::{Error, Result};
use image::{DynamicImage, GrayImage};
use opencv::{
    core::{Mat, Vector, CV_8UC1},
    imgcodecs,
    prelude::*,
};
use std::path::Path;

/// Image utility functions
pub struct ImageUtils;

impl ImageUtils {
    /// Decode an image file and convert it to a single-channel 8-bit Mat.
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| Error::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::dynamic_to_gray_mat(&img)
    }

    /// Convert any decoded image to a grayscale Mat.
    pub fn dynamic_to_gray_mat(img: &DynamicImage) -> Result<Mat> {
        Self::gray_to_mat(&img.to_luma8())
    }

    /// Copy an 8-bit grayscale buffer into an owned Mat.
    pub fn gray_to_mat(gray: &GrayImage) -> Result<Mat> {
        let (width, height) = gray.dimensions();
        let view = Mat::from_slice_rows_cols(gray.as_raw().as_slice(), height as usize, width as usize)?;
        Ok(view.try_clone()?)
    }

    /// Copy a single-channel 8-bit Mat back into a grayscale buffer.
    pub fn mat_to_gray(mat: &Mat) -> Result<GrayImage> {
        if mat.typ() != CV_8UC1 {
            return Err(Error::Decode {
                path: "<mat>".into(),
                reason: format!("expected an 8-bit single channel Mat, got type {}", mat.typ()),
            });
        }

        let owned;
        let continuous = if mat.is_continuous() {
            mat
        } else {
            owned = mat.try_clone()?;
            &owned
        };

        let bytes = continuous.data_bytes()?.to_vec();
        GrayImage::from_raw(continuous.cols() as u32, continuous.rows() as u32, bytes).ok_or_else(|| {
            Error::Decode {
                path: "<mat>".into(),
                reason: "buffer size does not match Mat dimensions".to_string(),
            }
        })
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();
        imgcodecs::imwrite(&path_str, mat, &Vector::new())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_gray_conversion_keeps_pixels() -> Result<()> {
        let mut gray = GrayImage::new(40, 30);
        gray.put_pixel(3, 7, Luma([200]));
        gray.put_pixel(39, 29, Luma([17]));

        let mat = ImageUtils::gray_to_mat(&gray)?;
        assert_eq!(mat.cols(), 40);
        assert_eq!(mat.rows(), 30);
        assert_eq!(*mat.at_2d::<u8>(7, 3)?, 200);

        let back = ImageUtils::mat_to_gray(&mat)?;
        assert_eq!(back, gray);
        Ok(())
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = ImageUtils::load_grayscale(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
