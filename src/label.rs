use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{YoloBox, LABEL_EXT};

/// Mirror an image path into the label tree: the path of `img_path` relative
/// to `image_dir`, re-rooted under `label_dir` with a `.txt` extension.
pub fn label_path_for(img_path: &Path, image_dir: &Path, label_dir: &Path) -> PathBuf {
    let rel = img_path.strip_prefix(image_dir).unwrap_or(img_path);
    label_dir.join(rel).with_extension(LABEL_EXT)
}

/// Parse one label line: `<class> <xc> <yc> <w> <h>`, whitespace separated.
/// Returns `None` for malformed lines (too few tokens or non-numeric values).
fn parse_line(line: &str) -> Option<YoloBox> {
    let mut tokens = line.split_whitespace();
    let class_id = tokens.next()?.parse().ok()?;
    let x_center = tokens.next()?.parse().ok()?;
    let y_center = tokens.next()?.parse().ok()?;
    let width = tokens.next()?.parse().ok()?;
    let height = tokens.next()?.parse().ok()?;
    Some(YoloBox {
        class_id,
        x_center,
        y_center,
        width,
        height,
    })
}

/// Read a YOLO label file into a box list, preserving line order.
/// Malformed lines are skipped; the rest of the file still parses.
pub fn parse_label_file(path: &Path) -> io::Result<Vec<YoloBox>> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().filter_map(parse_line).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_valid() {
        let b = parse_line("0 0.5 0.5 0.2 0.2").unwrap();
        assert_eq!(b.class_id, 0);
        assert_eq!(b.x_center, 0.5);
        assert_eq!(b.width, 0.2);
    }

    #[test]
    fn test_parse_line_malformed() {
        assert!(parse_line("").is_none());
        assert!(parse_line("0 0.5 0.5").is_none());
        assert!(parse_line("x 0.5 0.5 0.2 0.2").is_none());
        assert!(parse_line("0 0.5 nan?? 0.2 0.2").is_none());
    }

    #[test]
    fn test_parse_line_extra_tokens_ok() {
        // Trailing tokens (e.g. a confidence column) are ignored
        assert!(parse_line("1 0.1 0.2 0.3 0.4 0.99").is_some());
    }

    #[test]
    fn test_label_path_mirrors_relative_path() {
        let img = Path::new("data/train/images/sub/a.jpg");
        let lbl = label_path_for(
            img,
            Path::new("data/train/images"),
            Path::new("data/train/labels"),
        );
        assert_eq!(lbl, Path::new("data/train/labels/sub/a.txt"));
    }
}
