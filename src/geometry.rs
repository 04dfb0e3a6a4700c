use crate::types::YoloBox;

/// Convert a normalized center/size box to absolute pixel bounds
/// `(x_min, y_min, x_max, y_max)`, clamped to the image rectangle.
///
/// A degenerate result (`x_max <= x_min` or `y_max <= y_min`) is a valid
/// output meaning there is nothing to occlude, not an error.
pub fn to_pixels(b: &YoloBox, img_w: u32, img_h: u32) -> (u32, u32, u32, u32) {
    let box_w = b.width * img_w as f64;
    let box_h = b.height * img_h as f64;
    let x_center = b.x_center * img_w as f64;
    let y_center = b.y_center * img_h as f64;

    let x_min = (x_center - box_w / 2.0) as i64;
    let y_min = (y_center - box_h / 2.0) as i64;
    let x_max = (x_center + box_w / 2.0) as i64;
    let y_max = (y_center + box_h / 2.0) as i64;

    (
        x_min.clamp(0, img_w as i64) as u32,
        y_min.clamp(0, img_h as i64) as u32,
        x_max.clamp(0, img_w as i64) as u32,
        y_max.clamp(0, img_h as i64) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> YoloBox {
        YoloBox {
            class_id: 0,
            x_center: x,
            y_center: y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_centered_box() {
        let b = boxed(0.5, 0.5, 0.2, 0.2);
        assert_eq!(to_pixels(&b, 100, 100), (40, 40, 60, 60));
    }

    #[test]
    fn test_clamped_to_image() {
        // Box hanging over the left/top edge
        let b = boxed(0.0, 0.0, 0.5, 0.5);
        let (x_min, y_min, x_max, y_max) = to_pixels(&b, 100, 100);
        assert_eq!((x_min, y_min), (0, 0));
        assert_eq!((x_max, y_max), (25, 25));

        // Box hanging over the right/bottom edge
        let b = boxed(1.0, 1.0, 0.5, 0.5);
        let (x_min, y_min, x_max, y_max) = to_pixels(&b, 100, 100);
        assert_eq!((x_min, y_min), (75, 75));
        assert_eq!((x_max, y_max), (100, 100));
    }

    #[test]
    fn test_degenerate_is_valid() {
        let b = boxed(0.5, 0.5, 0.0, 0.0);
        let (x_min, _, x_max, _) = to_pixels(&b, 100, 100);
        assert!(x_max <= x_min + 1);
    }

    #[test]
    fn test_bounds_ordering() {
        let b = boxed(0.3, 0.7, 0.4, 0.1);
        let (x_min, y_min, x_max, y_max) = to_pixels(&b, 640, 480);
        assert!(x_min <= x_max && x_max <= 640);
        assert!(y_min <= y_max && y_max <= 480);
    }
}
