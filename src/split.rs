use log::{error, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Confirm, SplitReport, IMG_FORMATS, LABEL_EXT};
use crate::utils::{create_progress_bar, file_map};

/// Ratios and cap for one split run. `test` takes whatever the floor
/// arithmetic on train and val leaves over.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub train_ratio: f32,
    pub val_ratio: f32,
    pub cap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            train_ratio: 0.70,
            val_ratio: 0.15,
            cap: 1786,
        }
    }
}

/// Inner-join image and label base names in the two source directories.
/// Returns `(image file name, label file name)` pairs sorted by base name;
/// unmatched files on either side are silently excluded here (reporting
/// them is the integrity checker's job).
pub fn collect_pairs(src_images: &Path, src_labels: &Path) -> Vec<(String, String)> {
    let images = file_map(src_images, IMG_FORMATS);
    let labels = file_map(src_labels, &[LABEL_EXT]);

    let mut pairs: Vec<(String, String)> = images
        .into_iter()
        .filter_map(|(base, img_name)| {
            labels.get(&base).map(|lbl_name| (img_name, lbl_name.clone()))
        })
        .collect();
    pairs.sort();
    pairs
}

/// Partition a raw category folder into `{out_root}/{train,val,test}/{images,labels}`.
///
/// Valid pairs are shuffled with the injected rng, truncated to the cap and
/// sliced by the floor arithmetic `train = floor(total*train_ratio)`,
/// `val = floor(total*val_ratio)`, `test = remainder`, so the three sizes
/// always sum to the capped total. Files are copied, never moved. An
/// existing output root is removed wholesale, gated by the confirmation
/// capability; refusal aborts with no partial writes.
pub fn split_dataset(
    src_images: &Path,
    src_labels: &Path,
    out_root: &Path,
    config: &SplitConfig,
    rng: &mut impl Rng,
    confirm: &dyn Confirm,
) -> SplitReport {
    if !src_images.exists() {
        return SplitReport::aborted(&format!("image directory not found: {}", src_images.display()));
    }
    if !src_labels.exists() {
        return SplitReport::aborted(&format!("label directory not found: {}", src_labels.display()));
    }

    let mut pairs = collect_pairs(src_images, src_labels);
    if pairs.is_empty() {
        return SplitReport::aborted("no valid image-label pairs found");
    }
    info!("Found {} valid pairs in source.", pairs.len());

    pairs.shuffle(rng);

    if pairs.len() > config.cap {
        info!(
            "Trimming dataset from {} down to {} pairs (cap).",
            pairs.len(),
            config.cap
        );
        pairs.truncate(config.cap);
    }

    let total = pairs.len();
    let train_size = (total as f32 * config.train_ratio) as usize;
    let val_size = (total as f32 * config.val_ratio) as usize;
    let test_size = total - train_size - val_size;
    info!(
        "Split distribution: train {} | val {} | test {}",
        train_size, val_size, test_size
    );

    if out_root.exists() {
        let prompt = format!(
            "'{}' already exists. Overwrite existing dataset?",
            out_root.display()
        );
        if !confirm.confirm(&prompt) {
            return SplitReport::aborted("overwrite declined");
        }
        if let Err(e) = fs::remove_dir_all(out_root) {
            return SplitReport::aborted(&format!(
                "failed to remove existing output root: {}",
                e
            ));
        }
    }

    let slices = [
        ("train", &pairs[..train_size]),
        ("val", &pairs[train_size..train_size + val_size]),
        ("test", &pairs[train_size + val_size..]),
    ];

    let mut report = SplitReport {
        success: true,
        ..Default::default()
    };

    for (split, slice) in slices {
        let (copied, failed) = match copy_pairs(slice, src_images, src_labels, out_root, split) {
            Ok(counts) => counts,
            Err(e) => {
                return SplitReport::aborted(&format!(
                    "failed to create {} directories: {}",
                    split, e
                ));
            }
        };
        match split {
            "train" => report.train_count = copied,
            "val" => report.val_count = copied,
            _ => report.test_count = copied,
        }
        report.failed += failed;
    }

    if report.failed > 0 {
        warn!("{} pair(s) failed to copy.", report.failed);
    }
    info!(
        "Split completed: train {} | val {} | test {} pairs copied.",
        report.train_count, report.val_count, report.test_count
    );
    report
}

fn copy_pairs(
    pairs: &[(String, String)],
    src_images: &Path,
    src_labels: &Path,
    out_root: &Path,
    split: &str,
) -> std::io::Result<(usize, usize)> {
    let dest_images: PathBuf = out_root.join(split).join("images");
    let dest_labels: PathBuf = out_root.join(split).join("labels");
    fs::create_dir_all(&dest_images)?;
    fs::create_dir_all(&dest_labels)?;

    let pb = create_progress_bar(pairs.len() as u64, split);
    let mut copied = 0;
    let mut failed = 0;

    for (img_name, lbl_name) in pairs {
        let result = fs::copy(src_images.join(img_name), dest_images.join(img_name))
            .and_then(|_| fs::copy(src_labels.join(lbl_name), dest_labels.join(lbl_name)));
        match result {
            Ok(_) => copied += 1,
            Err(e) => {
                error!("Failed to copy {}: {}", img_name, e);
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("copy complete");
    Ok((copied, failed))
}
