use log::{error, info, warn};
use rand::Rng;
use std::path::Path;

use crate::augment::AugmentStage;
use crate::batch::{run_stage, BatchOptions};
use crate::occlusion::OcclusionConfig;
use crate::split::{split_dataset, SplitConfig};
use crate::types::Confirm;

/// Full per-category preparation: split, then the augmentation chain over
/// the train split. Later stages deliberately compound over earlier
/// outputs, because each batch pass re-snapshots the train directory.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Category folder names under the base directory, each holding
    /// `images` and `labels`; output goes to `{category}_dataset`.
    pub categories: Vec<String>,
    pub split: SplitConfig,
    /// One brightness pass per factor, applied to original images only.
    pub brightness_factors: Vec<f32>,
    pub blur_radius: f32,
    pub occlusion: OcclusionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            categories: Vec::new(),
            split: SplitConfig::default(),
            brightness_factors: vec![0.7, 1.3],
            blur_radius: 1.0,
            occlusion: OcclusionConfig::default(),
        }
    }
}

/// Run the whole preparation pipeline for every configured category.
/// A category with a missing source folder or a failed split is logged and
/// skipped; the remaining categories still run.
pub fn run_pipeline(
    base_dir: &Path,
    config: &PipelineConfig,
    rng: &mut impl Rng,
    confirm: &dyn Confirm,
) {
    info!("Starting pipeline for {} categories.", config.categories.len());

    for category in &config.categories {
        info!("=== Processing category: {} ===", category);

        let src_images = base_dir.join(category).join("images");
        let src_labels = base_dir.join(category).join("labels");
        if !src_images.exists() {
            warn!(
                "Skipping {}: source folder {:?} not found.",
                category, src_images
            );
            continue;
        }

        let out_root = base_dir.join(format!("{}_dataset", category));
        let split_report = split_dataset(
            &src_images,
            &src_labels,
            &out_root,
            &config.split,
            rng,
            confirm,
        );
        if !split_report.success {
            error!(
                "Split failed for {} ({}). Skipping augmentations.",
                category,
                split_report.error.as_deref().unwrap_or("unknown")
            );
            continue;
        }

        let train_images = out_root.join("train").join("images");
        let train_labels = out_root.join("train").join("labels");

        // Brightness runs only over originals; its own outputs carry the
        // marker and are excluded from subsequent brightness snapshots
        for &factor in &config.brightness_factors {
            let stage = AugmentStage::Brightness { factor };
            let options = BatchOptions {
                exclude_containing: Some("_bright".to_string()),
            };
            run_stage(&stage, &train_images, &train_labels, &options, rng)
                .log_summary(&format!("{} brightness({})", category, factor));
        }

        // Blur and occlusion compound: each re-snapshot picks up the
        // variants produced by the passes before it
        let stage = AugmentStage::Blur {
            radius: config.blur_radius,
        };
        run_stage(&stage, &train_images, &train_labels, &BatchOptions::default(), rng)
            .log_summary(&format!("{} blur", category));

        let stage = AugmentStage::Occlusion {
            config: config.occlusion.clone(),
        };
        run_stage(&stage, &train_images, &train_labels, &BatchOptions::default(), rng)
            .log_summary(&format!("{} occlusion", category));

        info!("Finished processing: {}", category);
    }

    info!("Pipeline completed.");
}
