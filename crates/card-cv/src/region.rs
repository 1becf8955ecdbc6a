//! Cropping card slots out of a composite

use crate::{Error, Result};
use card_core::{SlotLayout, SlotRect};
use opencv::{
    core::{Mat, Rect},
    prelude::*,
};

/// Extracts the fixed slot rectangles from a composite image.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionExtractor;

impl RegionExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn to_rect(rect: SlotRect) -> Rect {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }

    /// Copy of exactly the slot's rectangle, any channel layout, no scaling.
    pub fn extract(&self, image: &Mat, slot: SlotLayout) -> Result<Mat> {
        let rect = slot.rect();
        let (width, height) = (image.cols(), image.rows());
        if !rect.fits_within(width, height) {
            return Err(Error::Layout { slot, width, height });
        }

        let view = Mat::roi(image, Self::to_rect(rect))?;
        Ok(view.try_clone()?)
    }
}
