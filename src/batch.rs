use glob::glob;
use log::{error, info};
use rand::Rng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::augment::AugmentStage;
use crate::label::{label_path_for, parse_label_file};
use crate::types::{BatchReport, IMG_FORMATS};
use crate::utils::{create_progress_bar, has_extension};

/// Options for one batch pass.
#[derive(Debug, Default, Clone)]
pub struct BatchOptions {
    /// Drop snapshot entries whose file name contains this marker. Used by
    /// the brightness pass to leave earlier brightness variants alone.
    pub exclude_containing: Option<String>,
}

/// Snapshot every image currently under `image_dir` (recursive), sorted.
///
/// The list is materialized before any write happens, so files created by
/// the pass that consumes it are never revisited within that pass. Later
/// passes re-snapshot and legitimately pick up earlier outputs; that is how
/// successive pipeline stages compound.
pub fn snapshot_images(image_dir: &Path, exclude_containing: Option<&str>) -> Vec<PathBuf> {
    // Marker matching is case-insensitive, like the extension check
    let marker = exclude_containing.map(str::to_lowercase);
    let pattern = format!("{}/**/*", image_dir.display());
    let mut files: Vec<PathBuf> = match glob(&pattern) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file() && has_extension(path, IMG_FORMATS))
            .filter(|path| match marker.as_deref() {
                Some(marker) => path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| !name.to_lowercase().contains(marker))
                    .unwrap_or(false),
                None => true,
            })
            .collect(),
        Err(e) => {
            error!("Failed to read snapshot pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    files.sort();
    files
}

/// Apply one augmentation stage to every image in a fresh snapshot of
/// `image_dir`, writing each derived image and a byte-identical label copy
/// next to their sources under suffixed names.
///
/// A missing label or (for occlusion) an empty box list skips the image;
/// any per-file decode, encode or copy failure is logged, counted and the
/// batch continues. There is no rollback.
pub fn run_stage(
    stage: &AugmentStage,
    image_dir: &Path,
    label_dir: &Path,
    options: &BatchOptions,
    rng: &mut impl Rng,
) -> BatchReport {
    let snapshot = snapshot_images(image_dir, options.exclude_containing.as_deref());
    let mut report = BatchReport {
        input_count: snapshot.len(),
        ..Default::default()
    };

    if snapshot.is_empty() {
        info!("No images found under {:?}, nothing to augment.", image_dir);
        return report.finish();
    }

    info!(
        "Applying {} to {} images under {:?}",
        stage.name(),
        snapshot.len(),
        image_dir
    );
    let pb = create_progress_bar(snapshot.len() as u64, stage.name());
    let suffix = stage.suffix();

    for img_path in &snapshot {
        let lbl_path = label_path_for(img_path, image_dir, label_dir);
        if !lbl_path.exists() {
            report.skipped += 1;
            pb.inc(1);
            continue;
        }

        match augment_one(stage, img_path, &lbl_path, &suffix, rng) {
            Ok(true) => report.created += 1,
            Ok(false) => report.skipped += 1,
            Err(e) => {
                error!("Failed to augment {}: {}", img_path.display(), e);
                report.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("batch complete");
    report.finish()
}

/// Generate one derived image/label pair. Returns `Ok(false)` when the
/// stage has nothing to do for this sample (skip, not failure).
pub(crate) fn augment_one(
    stage: &AugmentStage,
    img_path: &Path,
    lbl_path: &Path,
    suffix: &str,
    rng: &mut impl Rng,
) -> Result<bool, Box<dyn std::error::Error>> {
    let boxes = parse_label_file(lbl_path)?;
    if stage.requires_boxes() && boxes.is_empty() {
        return Ok(false);
    }

    let image = image::open(img_path)?.to_rgb8();
    let augmented = stage.apply(&image, &boxes, rng);

    let new_img_path = suffixed_path(img_path, suffix)?;
    let new_lbl_path = suffixed_path(lbl_path, suffix)?;
    augmented.save(&new_img_path)?;
    fs::copy(lbl_path, &new_lbl_path)?;
    Ok(true)
}

/// `dir/name.ext` -> `dir/name{suffix}.ext`
pub(crate) fn suffixed_path(path: &Path, suffix: &str) -> io::Result<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no valid stem"))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no extension"))?;
    Ok(path.with_file_name(format!("{}{}.{}", stem, suffix, ext)))
}

/// Random-brightness sweep: for each snapshot image, generate `per_image`
/// variants with factors drawn uniformly from `range`. Factors landing too
/// close to 1.0 are resampled to a visibly different level, and each variant
/// carries an `_aug{n}` marker so repeated draws of similar factors cannot
/// collide on disk.
pub fn run_random_brightness(
    image_dir: &Path,
    label_dir: &Path,
    per_image: usize,
    range: (f32, f32),
    options: &BatchOptions,
    rng: &mut impl Rng,
) -> BatchReport {
    let (lo, hi) = if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    };
    let snapshot = snapshot_images(image_dir, options.exclude_containing.as_deref());
    let mut report = BatchReport {
        input_count: snapshot.len(),
        ..Default::default()
    };

    if snapshot.is_empty() || per_image == 0 {
        info!("No images found under {:?}, nothing to augment.", image_dir);
        return report.finish();
    }

    let pb = create_progress_bar((snapshot.len() * per_image) as u64, "brightness");
    let mut aug_num: usize = 0;

    for img_path in &snapshot {
        let lbl_path = label_path_for(img_path, image_dir, label_dir);
        if !lbl_path.exists() {
            report.skipped += per_image;
            pb.inc(per_image as u64);
            continue;
        }

        for _ in 0..per_image {
            aug_num += 1;
            let mut factor: f32 = rng.gen_range(lo..=hi);
            if (0.95..1.05).contains(&factor) {
                factor = if rng.gen_bool(0.5) { 0.85 } else { 1.15 };
            }
            let stage = AugmentStage::Brightness { factor };
            let suffix = format!("{}_aug{}", stage.suffix(), aug_num);
            match augment_one(&stage, img_path, &lbl_path, &suffix, rng) {
                Ok(true) => report.created += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to augment {}: {}", img_path.display(), e);
                    report.failed += 1;
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_with_message("batch complete");
    report.finish()
}
