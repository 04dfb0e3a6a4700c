use log::{error, info};
use rand::Rng;
use std::fs;
use std::io;
use std::path::Path;

use crate::augment::AugmentStage;
use crate::label::parse_label_file;
use crate::types::{BatchReport, IMG_FORMATS, LABEL_EXT};
use crate::utils::{create_progress_bar, list_files};

/// Build a compound stress-test set: apply an ordered chain of stages to
/// every sample under `{src_root}/images|labels` and write the results
/// under `{dst_root}` with **unchanged** base names. The destination folder
/// name, not a suffix chain, marks the lineage here, so a stressed copy of
/// an entire split can be fed straight to evaluation. Labels are
/// byte-identical copies of their sources.
pub fn generate_stress_set(
    src_root: &Path,
    dst_root: &Path,
    stages: &[AugmentStage],
    rng: &mut impl Rng,
) -> io::Result<BatchReport> {
    let src_images = src_root.join("images");
    let src_labels = src_root.join("labels");
    let dst_images = dst_root.join("images");
    let dst_labels = dst_root.join("labels");
    fs::create_dir_all(&dst_images)?;
    fs::create_dir_all(&dst_labels)?;

    let files = list_files(&src_images, IMG_FORMATS);
    let mut report = BatchReport {
        input_count: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        info!("No images found under {:?}.", src_images);
        return Ok(report.finish());
    }

    let chain: Vec<&str> = stages.iter().map(|s| s.name()).collect();
    info!(
        "Generating stress set [{}] into {:?}",
        chain.join(" -> "),
        dst_root
    );
    let pb = create_progress_bar(files.len() as u64, "stress");

    for img_path in &files {
        let Some(name) = img_path.file_name().and_then(|n| n.to_str()) else {
            report.skipped += 1;
            pb.inc(1);
            continue;
        };
        let Some(stem) = img_path.file_stem().and_then(|n| n.to_str()) else {
            report.skipped += 1;
            pb.inc(1);
            continue;
        };
        let lbl_path = src_labels.join(format!("{}.{}", stem, LABEL_EXT));
        if !lbl_path.exists() {
            report.skipped += 1;
            pb.inc(1);
            continue;
        }

        let result = (|| -> Result<(), Box<dyn std::error::Error>> {
            let boxes = parse_label_file(&lbl_path)?;
            let mut image = image::open(img_path)?.to_rgb8();
            for stage in stages {
                image = stage.apply(&image, &boxes, rng);
            }
            image.save(dst_images.join(name))?;
            fs::copy(&lbl_path, dst_labels.join(format!("{}.{}", stem, LABEL_EXT)))?;
            Ok(())
        })();

        match result {
            Ok(_) => report.created += 1,
            Err(e) => {
                error!("Failed to process {}: {}", img_path.display(), e);
                report.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("stress set complete");
    Ok(report.finish())
}
