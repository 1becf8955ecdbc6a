//! Deterministic fixtures shared by unit tests

use crate::catalog::TemplateCatalog;
use crate::template::FeatureMatcher;
use crate::utils::ImageUtils;
use crate::Result;
use card_core::layout::{CARD_HEIGHT, CARD_WIDTH};
use card_core::{CardIdentity, SlotLayout};
use image::{GrayImage, Luma};
use opencv::core::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Card-sized image of 4x4 blocks of random gray levels.
pub fn noise_card(seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let (width, height) = (CARD_WIDTH as u32, CARD_HEIGHT as u32);
    let blocks: Vec<u8> = (0..(width / 4 + 1) * (height / 4 + 1))
        .map(|_| rng.gen_range(0..=255))
        .collect();

    GrayImage::from_fn(width, height, |x, y| {
        Luma([blocks[((y / 4) * (width / 4 + 1) + x / 4) as usize]])
    })
}

pub fn to_mat(gray: &GrayImage) -> Mat {
    ImageUtils::gray_to_mat(gray).unwrap()
}

pub fn to_gray(mat: &Mat) -> GrayImage {
    ImageUtils::mat_to_gray(mat).unwrap()
}

/// Catalog of `count` noise cards named `card-<i>`, seeded by their index.
pub fn catalog(matcher: &FeatureMatcher, count: usize) -> Result<(TemplateCatalog, Vec<GrayImage>)> {
    let cards: Vec<GrayImage> = (0..count).map(|i| noise_card(i as u64)).collect();
    let catalog = TemplateCatalog::from_images(
        matcher,
        cards
            .iter()
            .enumerate()
            .map(|(i, card)| (CardIdentity::new(format!("card-{i}")), to_mat(card))),
    )?;
    Ok((catalog, cards))
}

/// Tile five cards into their slots on a mid-gray background.
pub fn composite(cards: [&GrayImage; 5]) -> GrayImage {
    let (width, height) = SlotLayout::bounding_size();
    let mut canvas = GrayImage::from_pixel(width as u32, height as u32, Luma([90]));
    for (slot, card) in SlotLayout::ALL.iter().zip(cards) {
        let rect = slot.rect();
        image::imageops::replace(&mut canvas, card, rect.x as i64, rect.y as i64);
    }
    canvas
}
