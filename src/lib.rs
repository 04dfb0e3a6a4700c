//! YOLO dataset preparation toolkit
//!
//! This library prepares object-detection training data: it splits raw
//! image/label collections into train/val/test partitions, synthesizes
//! photometric and occlusion stress variants of training images, merges
//! per-category datasets into one corpus and verifies that every image has
//! a matching label. Every augmentation is label-preserving: derived images
//! carry a byte-identical copy of their source label under a suffixed name
//! that records the augmentation lineage.

pub mod augment;
pub mod batch;
pub mod config;
pub mod geometry;
pub mod integrity;
pub mod label;
pub mod merge;
pub mod occlusion;
pub mod pipeline;
pub mod split;
pub mod stress;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use augment::{adjust_brightness, AugmentStage};
pub use batch::{run_random_brightness, run_stage, snapshot_images, BatchOptions};
pub use config::{Cli, Command};
pub use geometry::to_pixels;
pub use integrity::{check, remove_orphans, RepairMode};
pub use merge::{merge_datasets, merge_split, verify_split};
pub use occlusion::{occlude_objects, OcclusionConfig, OcclusionShape};
pub use pipeline::{run_pipeline, PipelineConfig};
pub use split::{collect_pairs, split_dataset, SplitConfig};
pub use stress::generate_stress_set;
pub use types::{
    AutoConfirm, BatchReport, Confirm, IntegrityReport, MergeReport, SplitReport, YoloBox,
    IMG_FORMATS, LABEL_EXT, MERGE_IMG_FORMATS, SPLITS,
};
