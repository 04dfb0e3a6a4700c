use log::info;
use serde::Serialize;

// Image formats accepted everywhere in the pipeline
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png"];

// The merger additionally accepts formats that occasionally show up in
// hand-collected category folders
pub const MERGE_IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

pub const LABEL_EXT: &str = "txt";

// Dataset split names, in processing order
pub const SPLITS: &[&str] = &["train", "val", "test"];

/// A single YOLO bounding box: class id plus center/size coordinates
/// normalized to the image dimensions (all four floats in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YoloBox {
    pub class_id: u32,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Outcome of one batch augmentation pass over a directory snapshot.
#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub success: bool,
    pub input_count: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub error: Option<String>,
}

impl BatchReport {
    /// A batch succeeds when every snapshot entry was created or skipped.
    pub fn finish(mut self) -> Self {
        self.success = self.failed == 0;
        if self.failed > 0 {
            self.error = Some(format!("{} file(s) failed to process", self.failed));
        }
        self
    }

    pub fn log_summary(&self, what: &str) {
        info!(
            "{}: input {} | created {} | skipped {} | failed {}",
            what, self.input_count, self.created, self.skipped, self.failed
        );
    }
}

/// Outcome of splitting a raw category folder into train/val/test.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SplitReport {
    pub success: bool,
    pub train_count: usize,
    pub val_count: usize,
    pub test_count: usize,
    pub failed: usize,
    pub error: Option<String>,
}

impl SplitReport {
    pub fn aborted(reason: &str) -> Self {
        SplitReport {
            success: false,
            error: Some(reason.to_string()),
            ..Default::default()
        }
    }
}

/// Outcome of merging several dataset roots into one corpus.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MergeReport {
    pub success: bool,
    pub total_copied: usize,
    pub split_counts: Vec<(String, usize)>,
    /// Splits whose destination image and label counts disagree after merging
    pub mismatched_splits: Vec<String>,
}

/// Orphan report for one images/labels directory pair. Orphans are base
/// names present on only one side of the join. Scanning itself cannot
/// fail (a missing directory just joins as empty), so `success` is always
/// true; it is carried to keep the report shape uniform across operations.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IntegrityReport {
    pub success: bool,
    pub valid_pairs: usize,
    pub orphan_images: Vec<String>,
    pub orphan_labels: Vec<String>,
    pub error: Option<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.orphan_images.is_empty() && self.orphan_labels.is_empty()
    }
}

/// Injected yes/no decision used to gate destructive actions. Library code
/// never reads the terminal; the CLI supplies an interactive implementation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Non-interactive answer: `AutoConfirm(true)` proceeds, `AutoConfirm(false)`
/// aborts every gated action.
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}
