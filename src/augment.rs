use image::RgbImage;
use rand::Rng;

use crate::occlusion::{occlude_objects, OcclusionConfig};
use crate::types::YoloBox;

/// One label-preserving transform. Every variant is geometry-invariant:
/// the label emitted for a derived image is always a byte-identical copy of
/// the source label, never recomputed.
#[derive(Debug, Clone)]
pub enum AugmentStage {
    /// Multiply every channel by `factor` (PIL-enhancer semantics);
    /// < 1.0 darkens, > 1.0 brightens.
    Brightness { factor: f32 },
    /// Gaussian blur with the given radius in pixels.
    Blur { radius: f32 },
    /// Paint one occlusion shape over each labeled object.
    Occlusion { config: OcclusionConfig },
}

impl AugmentStage {
    pub fn apply(&self, image: &RgbImage, boxes: &[YoloBox], rng: &mut impl Rng) -> RgbImage {
        match self {
            AugmentStage::Brightness { factor } => adjust_brightness(image, *factor),
            AugmentStage::Blur { radius } => {
                if *radius > 0.0 {
                    image::imageops::blur(image, *radius)
                } else {
                    image.clone()
                }
            }
            AugmentStage::Occlusion { config } => {
                let mut out = image.clone();
                occlude_objects(&mut out, boxes, config, rng);
                out
            }
        }
    }

    /// Lineage suffix appended to the base name of both the derived image
    /// and its label copy, keeping the pair joinable. Chained stages stack
    /// suffixes, e.g. `img_bright0_70_blur.jpg`.
    pub fn suffix(&self) -> String {
        match self {
            AugmentStage::Brightness { factor } => {
                let encoded = format!("{:.2}", factor).replace('.', "_");
                format!("_bright{}", encoded)
            }
            AugmentStage::Blur { .. } => "_blur".to_string(),
            AugmentStage::Occlusion { .. } => "_occ".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AugmentStage::Brightness { .. } => "brightness",
            AugmentStage::Blur { .. } => "blur",
            AugmentStage::Occlusion { .. } => "occlusion",
        }
    }

    /// Occlusion has nothing to paint without boxes; photometric stages
    /// apply to the whole frame regardless.
    pub fn requires_boxes(&self) -> bool {
        matches!(self, AugmentStage::Occlusion { .. })
    }
}

/// Per-channel multiplicative brightness, clamped to the valid range.
pub fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (f32::from(*channel) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_brightness_suffix_encoding() {
        let stage = AugmentStage::Brightness { factor: 0.7 };
        assert_eq!(stage.suffix(), "_bright0_70");
        let stage = AugmentStage::Brightness { factor: 1.3 };
        assert_eq!(stage.suffix(), "_bright1_30");
    }

    #[test]
    fn test_brightness_multiplies_and_clamps() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([100, 0, 200]));
        img.put_pixel(1, 0, Rgb([255, 10, 128]));

        let dark = adjust_brightness(&img, 0.5);
        assert_eq!(dark.get_pixel(0, 0).0, [50, 0, 100]);

        let bright = adjust_brightness(&img, 2.0);
        assert_eq!(bright.get_pixel(0, 0).0, [200, 0, 255]);
        assert_eq!(bright.get_pixel(1, 0).0, [255, 20, 255]);
    }

    #[test]
    fn test_identity_factor_keeps_pixels() {
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(1, 1, Rgb([12, 34, 56]));
        let same = adjust_brightness(&img, 1.0);
        assert_eq!(img, same);
    }
}
