//! Fixed five-slot composite layout
//!
//! The composite is two rows of cards: three on top, two below, with the
//! bottom row shifted right by roughly half a card. Every rectangle is a
//! constant; nothing here is derived from the input image.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const CARD_WIDTH: i32 = 367;
pub const CARD_HEIGHT: i32 = 512;
pub const CARD_PADDING: i32 = 20;
/// Horizontal offset of the bottom row relative to the top row.
pub const BOTTOM_ROW_SHIFT: i32 = 193;

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SlotRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether the rectangle lies entirely inside an image of the given size.
    pub fn fits_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width && self.bottom() <= height
    }

    pub fn intersects(&self, other: &SlotRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Logical card positions within the composite, in recognition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotLayout {
    TopLeft,
    TopMiddle,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl SlotLayout {
    pub const ALL: [SlotLayout; 5] = [
        SlotLayout::TopLeft,
        SlotLayout::TopMiddle,
        SlotLayout::TopRight,
        SlotLayout::BottomLeft,
        SlotLayout::BottomRight,
    ];

    pub const fn rect(&self) -> SlotRect {
        let row2 = CARD_HEIGHT + CARD_PADDING;
        match self {
            SlotLayout::TopLeft => SlotRect::new(0, 0, CARD_WIDTH, CARD_HEIGHT),
            SlotLayout::TopMiddle => {
                SlotRect::new(CARD_WIDTH + CARD_PADDING, 0, CARD_WIDTH, CARD_HEIGHT)
            }
            SlotLayout::TopRight => {
                SlotRect::new(2 * (CARD_WIDTH + CARD_PADDING), 0, CARD_WIDTH, CARD_HEIGHT)
            }
            SlotLayout::BottomLeft => {
                SlotRect::new(BOTTOM_ROW_SHIFT, row2, CARD_WIDTH, CARD_HEIGHT)
            }
            SlotLayout::BottomRight => SlotRect::new(
                BOTTOM_ROW_SHIFT + CARD_WIDTH + CARD_PADDING,
                row2,
                CARD_WIDTH,
                CARD_HEIGHT,
            ),
        }
    }

    /// Smallest composite size `(width, height)` containing every slot.
    pub fn bounding_size() -> (i32, i32) {
        Self::ALL.iter().fold((0, 0), |(w, h), slot| {
            let rect = slot.rect();
            (w.max(rect.right()), h.max(rect.bottom()))
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlotLayout::TopLeft => "TopLeft",
            SlotLayout::TopMiddle => "TopMiddle",
            SlotLayout::TopRight => "TopRight",
            SlotLayout::BottomLeft => "BottomLeft",
            SlotLayout::BottomRight => "BottomRight",
        }
    }
}

impl fmt::Display for SlotLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_rectangles() {
        assert_eq!(SlotLayout::TopLeft.rect(), SlotRect::new(0, 0, 367, 512));
        assert_eq!(SlotLayout::TopMiddle.rect(), SlotRect::new(387, 0, 367, 512));
        assert_eq!(SlotLayout::TopRight.rect(), SlotRect::new(774, 0, 367, 512));
        assert_eq!(SlotLayout::BottomLeft.rect(), SlotRect::new(193, 532, 367, 512));
        assert_eq!(SlotLayout::BottomRight.rect(), SlotRect::new(580, 532, 367, 512));
    }

    #[test]
    fn test_slots_do_not_overlap() {
        for (i, a) in SlotLayout::ALL.iter().enumerate() {
            for b in &SlotLayout::ALL[i + 1..] {
                assert!(!a.rect().intersects(&b.rect()), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn test_slots_fit_bounding_size() {
        let (width, height) = SlotLayout::bounding_size();
        assert_eq!((width, height), (1141, 1044));

        for slot in SlotLayout::ALL {
            assert!(slot.rect().fits_within(width, height));
        }
        assert!(!SlotLayout::TopRight.rect().fits_within(width - 1, height));
        assert!(!SlotLayout::BottomLeft.rect().fits_within(width, height - 1));
    }
}
