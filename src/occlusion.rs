use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::geometry::to_pixels;
use crate::types::YoloBox;

/// Objects this small (in pixels, either dimension) are left untouched;
/// occluding them would wipe out the detection entirely.
pub const MIN_OCCLUDABLE_DIM: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionShape {
    Rectangle,
    Ellipse,
}

const SHAPES: &[OcclusionShape] = &[OcclusionShape::Rectangle, OcclusionShape::Ellipse];

/// Tunables for the occlusion synthesizer. The ratio is the fraction of an
/// object's pixel area targeted for obstruction, drawn per object.
#[derive(Debug, Clone)]
pub struct OcclusionConfig {
    pub ratios: Vec<f64>,
    pub color: Rgb<u8>,
}

impl Default for OcclusionConfig {
    fn default() -> Self {
        OcclusionConfig {
            ratios: vec![0.30, 0.40, 0.50, 0.60],
            color: Rgb([128, 128, 128]),
        }
    }
}

/// Paint one occlusion shape over each labeled object, in place.
///
/// Per box: convert to pixel bounds, pick a coverage ratio and a shape,
/// size the shape to the target area, clamp it into the object rectangle
/// and place it at a uniformly random offset inside the remaining slack.
/// Boxes are independent, so a multi-object image receives differing
/// occlusion severities. Labels are never modified by this operation.
pub fn occlude_objects(
    image: &mut RgbImage,
    boxes: &[YoloBox],
    config: &OcclusionConfig,
    rng: &mut impl Rng,
) {
    let (img_w, img_h) = image.dimensions();

    for b in boxes {
        let (x_min, y_min, x_max, y_max) = to_pixels(b, img_w, img_h);
        let obj_w = x_max.saturating_sub(x_min) as i64;
        let obj_h = y_max.saturating_sub(y_min) as i64;

        if obj_w <= MIN_OCCLUDABLE_DIM || obj_h <= MIN_OCCLUDABLE_DIM {
            continue;
        }

        let Some(&ratio) = config.ratios.choose(rng) else {
            continue;
        };
        let target_area = obj_w as f64 * obj_h as f64 * ratio;

        let Some(&shape) = SHAPES.choose(rng) else {
            continue;
        };

        let (mut occ_w, mut occ_h) = match shape {
            OcclusionShape::Rectangle => {
                let aspect: f64 = rng.gen_range(0.5..=2.0);
                let occ_w = (target_area * aspect).sqrt().round() as i64;
                let occ_h = (target_area / aspect).sqrt().round() as i64;
                (occ_w, occ_h)
            }
            OcclusionShape::Ellipse => {
                let radius = (target_area / std::f64::consts::PI).sqrt().round() as i64;
                let radius = radius.min(obj_w.min(obj_h) / 2);
                (radius * 2, radius * 2)
            }
        };

        // Raw sizing can exceed the object; cap only after the shape math
        occ_w = occ_w.min(obj_w);
        occ_h = occ_h.min(obj_h);
        if occ_w <= 0 || occ_h <= 0 {
            continue;
        }

        let offset_x = rng.gen_range(0..=obj_w - occ_w);
        let offset_y = rng.gen_range(0..=obj_h - occ_h);
        let start_x = x_min as i64 + offset_x;
        let start_y = y_min as i64 + offset_y;

        match shape {
            OcclusionShape::Rectangle => {
                let rect =
                    Rect::at(start_x as i32, start_y as i32).of_size(occ_w as u32, occ_h as u32);
                draw_filled_rect_mut(image, rect, config.color);
            }
            OcclusionShape::Ellipse => {
                let radius = (occ_w / 2) as i32;
                let center = (start_x as i32 + radius, start_y as i32 + radius);
                draw_filled_ellipse_mut(image, center, radius, radius, config.color);
            }
        }
    }
}
