use log::{error, info};
use std::fs;
use std::path::Path;

use crate::types::{Confirm, IntegrityReport, IMG_FORMATS, LABEL_EXT};
use crate::utils::file_map;

/// Which side of the join to clean up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairMode {
    Images,
    Labels,
    All,
}

/// Join image and label base names and report everything present on only
/// one side. Orphan lists are sorted base names.
pub fn check(image_dir: &Path, label_dir: &Path) -> IntegrityReport {
    let images = file_map(image_dir, IMG_FORMATS);
    let labels = file_map(label_dir, &[LABEL_EXT]);

    let mut orphan_images: Vec<String> = images
        .keys()
        .filter(|base| !labels.contains_key(*base))
        .cloned()
        .collect();
    let mut orphan_labels: Vec<String> = labels
        .keys()
        .filter(|base| !images.contains_key(*base))
        .cloned()
        .collect();
    orphan_images.sort();
    orphan_labels.sort();

    let valid_pairs = images.len() - orphan_images.len();

    IntegrityReport {
        success: true,
        valid_pairs,
        orphan_images,
        orphan_labels,
        error: None,
    }
}

/// Delete the orphans named by `report`, gated by the confirmation
/// capability. Individual deletion failures are logged and do not halt the
/// remaining deletions. Returns the number of files removed.
pub fn remove_orphans(
    image_dir: &Path,
    label_dir: &Path,
    report: &IntegrityReport,
    mode: RepairMode,
    confirm: &dyn Confirm,
) -> usize {
    let target_count = match mode {
        RepairMode::Images => report.orphan_images.len(),
        RepairMode::Labels => report.orphan_labels.len(),
        RepairMode::All => report.orphan_images.len() + report.orphan_labels.len(),
    };
    if target_count == 0 {
        info!("No orphans to remove.");
        return 0;
    }
    if !confirm.confirm(&format!("Delete {} orphan file(s)?", target_count)) {
        info!("Orphan removal declined.");
        return 0;
    }

    let mut deleted = 0;

    if matches!(mode, RepairMode::Images | RepairMode::All) {
        let images = file_map(image_dir, IMG_FORMATS);
        for base in &report.orphan_images {
            let Some(name) = images.get(base) else {
                continue;
            };
            let path = image_dir.join(name);
            match fs::remove_file(&path) {
                Ok(_) => {
                    info!("Deleted orphan image: {}", name);
                    deleted += 1;
                }
                Err(e) => error!("Failed to delete {}: {}", path.display(), e),
            }
        }
    }

    if matches!(mode, RepairMode::Labels | RepairMode::All) {
        let labels = file_map(label_dir, &[LABEL_EXT]);
        for base in &report.orphan_labels {
            let Some(name) = labels.get(base) else {
                continue;
            };
            let path = label_dir.join(name);
            match fs::remove_file(&path) {
                Ok(_) => {
                    info!("Deleted orphan label: {}", name);
                    deleted += 1;
                }
                Err(e) => error!("Failed to delete {}: {}", path.display(), e),
            }
        }
    }

    info!("Cleanup complete. Removed {} file(s).", deleted);
    deleted
}
