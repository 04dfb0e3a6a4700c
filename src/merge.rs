use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{MergeReport, LABEL_EXT, MERGE_IMG_FORMATS, SPLITS};
use crate::utils::{create_progress_bar, file_map, list_files};

/// Tag prepended to base names when merging with prefixes. Sources are
/// usually `{dataset}/{split}` paths, so the dataset directory above the
/// split component is the natural collision-free namespace.
fn source_tag(source: &Path) -> String {
    let last = source.file_name().and_then(|n| n.to_str()).unwrap_or("src");
    let tag = if SPLITS.contains(&last) {
        source
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(last)
    } else {
        last
    };
    sanitize_filename::sanitize(tag)
}

/// Merge the `images`/`labels` trees of several split roots into `dest`.
///
/// Pairs are inner-joined per source; with `add_prefix` the destination
/// base name becomes `{source_tag}_{base}`, which keeps sources that share
/// original base names collision-free. Returns the number of pairs copied.
pub fn merge_split(sources: &[PathBuf], dest: &Path, add_prefix: bool) -> io::Result<usize> {
    let dest_images = dest.join("images");
    let dest_labels = dest.join("labels");
    fs::create_dir_all(&dest_images)?;
    fs::create_dir_all(&dest_labels)?;

    // Gather every matched pair up front so progress has a stable total
    let mut tasks: Vec<(PathBuf, PathBuf, String)> = Vec::new();
    for source in sources {
        if !source.exists() {
            continue;
        }
        let img_dir = source.join("images");
        let lbl_dir = source.join("labels");
        let images = file_map(&img_dir, MERGE_IMG_FORMATS);
        let labels = file_map(&lbl_dir, &[LABEL_EXT]);
        let tag = source_tag(source);

        let mut stems: Vec<&String> = images.keys().filter(|s| labels.contains_key(*s)).collect();
        stems.sort();
        for stem in stems {
            tasks.push((
                img_dir.join(&images[stem]),
                lbl_dir.join(&labels[stem]),
                tag.clone(),
            ));
        }
    }

    if tasks.is_empty() {
        info!("No files found for {:?}.", dest);
        return Ok(0);
    }

    let pb = create_progress_bar(tasks.len() as u64, "merge");
    let mut copied = 0;

    for (img_path, lbl_path, tag) in &tasks {
        let stem = img_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let ext = img_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let new_stem = if add_prefix {
            format!("{}_{}", tag, stem)
        } else {
            stem.to_string()
        };

        let result = fs::copy(img_path, dest_images.join(format!("{}.{}", new_stem, ext)))
            .and_then(|_| {
                fs::copy(
                    lbl_path,
                    dest_labels.join(format!("{}.{}", new_stem, LABEL_EXT)),
                )
            });
        match result {
            Ok(_) => copied += 1,
            Err(e) => error!("Failed to copy {}: {}", img_path.display(), e),
        }
        pb.inc(1);
    }

    pb.finish_with_message("merge complete");
    Ok(copied)
}

/// Count images and labels present in a merged destination.
pub fn verify_split(dest: &Path) -> (usize, usize) {
    let image_count = list_files(&dest.join("images"), MERGE_IMG_FORMATS).len();
    let label_count = list_files(&dest.join("labels"), &[LABEL_EXT]).len();
    (image_count, label_count)
}

/// Union several dataset roots into one corpus, split by split. A count
/// mismatch in a merged split is reported as a warning, never a failure.
pub fn merge_datasets(
    source_roots: &[PathBuf],
    dest_root: &Path,
    add_prefix: bool,
) -> io::Result<MergeReport> {
    let mut report = MergeReport {
        success: true,
        ..Default::default()
    };

    for split in SPLITS {
        info!("Processing {} split...", split);
        let sources: Vec<PathBuf> = source_roots.iter().map(|root| root.join(split)).collect();
        let dest = dest_root.join(split);
        let copied = merge_split(&sources, &dest, add_prefix)?;

        if copied > 0 {
            let (image_count, label_count) = verify_split(&dest);
            if image_count != label_count {
                warn!(
                    "{}: {} images vs {} labels after merge",
                    split, image_count, label_count
                );
                report.mismatched_splits.push(split.to_string());
            } else {
                info!("{}: {} images | {} labels | OK", split, image_count, label_count);
            }
        }

        report.total_copied += copied;
        report.split_counts.push((split.to_string(), copied));
    }

    Ok(report)
}
