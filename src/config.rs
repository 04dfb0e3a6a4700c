use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// Dataset preparation toolkit for YOLO object detection: split raw
/// image/label collections, synthesize photometric and occlusion stress
/// variants, merge per-category datasets and verify pair integrity.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Seed for every random operation (shuffling, occlusion placement)
    #[arg(long = "seed", default_value_t = 42, global = true)]
    pub seed: u64,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Never prompt; treat every confirmation as declined
    #[arg(long = "no-input", global = true, conflicts_with = "assume_yes")]
    pub no_input: bool,

    /// Print the operation report as JSON on stdout
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a raw category folder into train/val/test partitions
    Split(SplitArgs),
    /// Generate augmented variants of a dataset split
    Augment(AugmentArgs),
    /// Merge multiple dataset roots into one corpus
    Merge(MergeArgs),
    /// Report or repair orphaned images and labels
    Check(CheckArgs),
    /// Run split + augmentation chain for several category folders
    Pipeline(PipelineArgs),
    /// Build a compound stress-test set from a source root
    Stress(StressArgs),
}

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Source image directory
    #[arg(long = "images", default_value = "images")]
    pub images: PathBuf,

    /// Source label directory
    #[arg(long = "labels", default_value = "labels")]
    pub labels: PathBuf,

    /// Output dataset root
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Proportion of pairs assigned to training
    #[arg(long = "train-ratio", default_value_t = 0.70, value_parser = validate_ratio)]
    pub train_ratio: f32,

    /// Proportion of pairs assigned to validation
    #[arg(long = "val-ratio", default_value_t = 0.15, value_parser = validate_ratio)]
    pub val_ratio: f32,

    /// Maximum number of pairs kept after shuffling (random subsampling)
    #[arg(long = "cap", default_value_t = 1786)]
    pub cap: usize,
}

/// Dataset root + split targeted by an augmentation pass.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Dataset root containing `{split}/images` and `{split}/labels`
    #[arg(long = "root")]
    pub root: PathBuf,

    /// Split to augment
    #[arg(long = "split", default_value = "train")]
    pub split: String,
}

#[derive(Args, Debug)]
pub struct AugmentArgs {
    #[command(subcommand)]
    pub stage: StageCommand,
}

#[derive(Subcommand, Debug)]
pub enum StageCommand {
    /// Multiply pixel values by fixed or random brightness factors
    Brightness(BrightnessArgs),
    /// Gaussian-blur every image in the split
    Blur(BlurArgs),
    /// Paint one occlusion shape over each labeled object
    Occlusion(OcclusionArgs),
}

#[derive(Args, Debug)]
pub struct BrightnessArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Fixed factors; one augmentation pass per value
    #[arg(long = "factors", value_delimiter = ',', default_values_t = vec![0.7, 1.3])]
    pub factors: Vec<f32>,

    /// Generate this many random variants per image instead of fixed passes
    #[arg(long = "random", conflicts_with = "factors")]
    pub random: Option<usize>,

    /// Lower bound for random factors
    #[arg(long = "min-factor", default_value_t = 0.7)]
    pub min_factor: f32,

    /// Upper bound for random factors
    #[arg(long = "max-factor", default_value_t = 1.3)]
    pub max_factor: f32,

    /// Also re-augment images that already carry a `_bright` marker
    #[arg(long = "include-augmented")]
    pub include_augmented: bool,
}

#[derive(Args, Debug)]
pub struct BlurArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Gaussian blur radius in pixels
    #[arg(long = "radius", default_value_t = 1.0)]
    pub radius: f32,
}

#[derive(Args, Debug)]
pub struct OcclusionArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Coverage ratios the synthesizer draws from, one per object
    #[arg(long = "ratios", value_delimiter = ',', default_values_t = vec![0.30, 0.40, 0.50, 0.60])]
    pub ratios: Vec<f64>,

    /// Fill color as `r,g,b`
    #[arg(long = "color", default_value = "128,128,128", value_parser = validate_color)]
    pub color: (u8, u8, u8),
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Dataset roots to merge
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Destination corpus root
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Keep original base names instead of prefixing the source tag
    #[arg(long = "no-prefix")]
    pub no_prefix: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Image directory to scan
    #[arg(long = "images")]
    pub images: PathBuf,

    /// Label directory to scan
    #[arg(long = "labels")]
    pub labels: PathBuf,

    /// Delete orphans after reporting
    #[arg(long = "fix", value_enum)]
    pub fix: Option<FixMode>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum FixMode {
    /// Delete images without a matching label
    Images,
    /// Delete labels without a matching image
    Labels,
    /// Delete both orphan sets
    All,
}

#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Directory holding the category folders
    #[arg(long = "base-dir", default_value = ".")]
    pub base_dir: PathBuf,

    /// Category folder names, each with `images` and `labels` inside
    #[arg(required = true, value_delimiter = ',')]
    pub categories: Vec<String>,

    #[arg(long = "train-ratio", default_value_t = 0.70, value_parser = validate_ratio)]
    pub train_ratio: f32,

    #[arg(long = "val-ratio", default_value_t = 0.15, value_parser = validate_ratio)]
    pub val_ratio: f32,

    #[arg(long = "cap", default_value_t = 1786)]
    pub cap: usize,

    /// Brightness factors; one pass over the originals per value
    #[arg(long = "brightness-factors", value_delimiter = ',', default_values_t = vec![0.7, 1.3])]
    pub brightness_factors: Vec<f32>,

    #[arg(long = "blur-radius", default_value_t = 1.0)]
    pub blur_radius: f32,

    #[arg(long = "occlusion-ratios", value_delimiter = ',', default_values_t = vec![0.30, 0.40, 0.50, 0.60])]
    pub occlusion_ratios: Vec<f64>,

    #[arg(long = "occlusion-color", default_value = "128,128,128", value_parser = validate_color)]
    pub occlusion_color: (u8, u8, u8),
}

#[derive(Args, Debug)]
pub struct StressArgs {
    /// Source root containing `images` and `labels`
    #[arg(long = "source")]
    pub source: PathBuf,

    /// Destination root for the stressed copies
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Occlude labeled objects (applied first)
    #[arg(long = "occlude")]
    pub occlude: bool,

    /// Brightness factor (applied second)
    #[arg(long = "brightness")]
    pub brightness: Option<f32>,

    /// Gaussian blur radius (applied last)
    #[arg(long = "blur")]
    pub blur: Option<f32>,

    #[arg(long = "occlusion-ratios", value_delimiter = ',', default_values_t = vec![0.30, 0.40, 0.50, 0.60])]
    pub occlusion_ratios: Vec<f64>,

    #[arg(long = "occlusion-color", default_value = "128,128,128", value_parser = validate_color)]
    pub occlusion_color: (u8, u8, u8),
}

// Validate that a ratio lies in [0.0, 1.0]
fn validate_ratio(s: &str) -> Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("RATIO must be between 0.0 and 1.0".to_string()),
    }
}

// Parse an `r,g,b` triple
fn validate_color(s: &str) -> Result<(u8, u8, u8), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("COLOR must be three comma-separated values, e.g. 128,128,128".to_string());
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid color channel: {}", part))?;
    }
    Ok((channels[0], channels[1], channels[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ratio() {
        assert!(validate_ratio("0.5").is_ok());
        assert!(validate_ratio("1.0").is_ok());
        assert!(validate_ratio("0.0").is_ok());
        assert!(validate_ratio("-0.1").is_err());
        assert!(validate_ratio("1.1").is_err());
        assert!(validate_ratio("abc").is_err());
    }

    #[test]
    fn test_validate_color() {
        assert_eq!(validate_color("128,128,128"), Ok((128, 128, 128)));
        assert_eq!(validate_color("40, 40, 40"), Ok((40, 40, 40)));
        assert!(validate_color("1,2").is_err());
        assert!(validate_color("256,0,0").is_err());
    }
}
