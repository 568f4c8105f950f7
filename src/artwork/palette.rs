//! Accent color extraction from album art.

use crate::theme::Color;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use std::collections::HashMap;

const SAMPLE_SIZE: u32 = 48;
// 5 bits per channel
const BUCKET_SHIFT: u8 = 3;
const MIN_VIBRANT_SATURATION: f32 = 0.35;

#[derive(Default)]
struct Bucket {
    count: u32,
    r: u32,
    g: u32,
    b: u32,
}

impl Bucket {
    fn color(&self) -> Color {
        Color::rgb(
            (self.r / self.count) as u8,
            (self.g / self.count) as u8,
            (self.b / self.count) as u8,
        )
    }
}

/// Pick an accent for `img`: the most common vibrant color, then the most
/// common muted one, then the dominant color. `None` for empty or fully
/// transparent images.
pub fn accent_color(img: &DynamicImage) -> Option<Color> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let sample = img.resize(SAMPLE_SIZE, SAMPLE_SIZE, FilterType::Triangle);

    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();
    for (_, _, px) in sample.pixels() {
        if px[3] < 128 {
            continue;
        }
        let key = (px[0] >> BUCKET_SHIFT, px[1] >> BUCKET_SHIFT, px[2] >> BUCKET_SHIFT);
        let bucket = buckets.entry(key).or_default();
        bucket.count += 1;
        bucket.r += px[0] as u32;
        bucket.g += px[1] as u32;
        bucket.b += px[2] as u32;
    }

    let mut vibrant: Option<(u32, Color)> = None;
    let mut muted: Option<(u32, Color)> = None;
    let mut dominant: Option<(u32, Color)> = None;

    for bucket in buckets.values() {
        let color = bucket.color();
        let (saturation, lightness) = color.saturation_lightness();
        let candidate = Some((bucket.count, color));

        if dominant.map_or(true, |(n, _)| bucket.count > n) {
            dominant = candidate;
        }
        if !(0.2..=0.8).contains(&lightness) {
            continue;
        }
        let slot = if saturation >= MIN_VIBRANT_SATURATION {
            &mut vibrant
        } else {
            &mut muted
        };
        if slot.map_or(true, |(n, _)| bucket.count > n) {
            *slot = candidate;
        }
    }

    vibrant.or(muted).or(dominant).map(|(_, color)| color)
}
