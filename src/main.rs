use clap::Parser;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use yolo_dataprep::config::{
    BrightnessArgs, Cli, Command, FixMode, StageCommand, StressArgs,
};
use yolo_dataprep::{
    check, generate_stress_set, merge_datasets, remove_orphans, run_pipeline, run_random_brightness,
    run_stage, split_dataset, AugmentStage, AutoConfirm, BatchOptions, BatchReport, Confirm,
    OcclusionConfig, PipelineConfig, RepairMode, SplitConfig,
};

/// Blocking yes/no prompt on the controlling terminal.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} (y/n): ", prompt);
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("y")
    }
}

fn print_json<T: Serialize>(report: &T) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize report: {}", e),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let confirm: Box<dyn Confirm> = if cli.assume_yes {
        Box::new(AutoConfirm(true))
    } else if cli.no_input {
        Box::new(AutoConfirm(false))
    } else {
        Box::new(StdinConfirm)
    };

    match cli.command {
        Command::Split(args) => {
            if args.train_ratio + args.val_ratio > 1.0 {
                error!("train-ratio + val-ratio must not exceed 1.0");
                return ExitCode::FAILURE;
            }
            let config = SplitConfig {
                train_ratio: args.train_ratio,
                val_ratio: args.val_ratio,
                cap: args.cap,
            };
            let report = split_dataset(
                &args.images,
                &args.labels,
                &args.output,
                &config,
                &mut rng,
                confirm.as_ref(),
            );
            if cli.json {
                print_json(&report);
            }
            if !report.success {
                error!(
                    "Split failed: {}",
                    report.error.as_deref().unwrap_or("unknown")
                );
                return ExitCode::FAILURE;
            }
        }

        Command::Augment(args) => {
            let report = match args.stage {
                StageCommand::Brightness(stage_args) => {
                    run_brightness(&stage_args, &mut rng)
                }
                StageCommand::Blur(stage_args) => {
                    let image_dir = stage_args.target.root.join(&stage_args.target.split).join("images");
                    let label_dir = stage_args.target.root.join(&stage_args.target.split).join("labels");
                    let stage = AugmentStage::Blur {
                        radius: stage_args.radius,
                    };
                    run_stage(&stage, &image_dir, &label_dir, &BatchOptions::default(), &mut rng)
                }
                StageCommand::Occlusion(stage_args) => {
                    let image_dir = stage_args.target.root.join(&stage_args.target.split).join("images");
                    let label_dir = stage_args.target.root.join(&stage_args.target.split).join("labels");
                    let (r, g, b) = stage_args.color;
                    let stage = AugmentStage::Occlusion {
                        config: OcclusionConfig {
                            ratios: stage_args.ratios,
                            color: image::Rgb([r, g, b]),
                        },
                    };
                    run_stage(&stage, &image_dir, &label_dir, &BatchOptions::default(), &mut rng)
                }
            };
            report.log_summary("augment");
            if cli.json {
                print_json(&report);
            }
        }

        Command::Merge(args) => {
            match merge_datasets(&args.sources, &args.output, !args.no_prefix) {
                Ok(report) => {
                    info!("Merged {} pairs into {:?}.", report.total_copied, args.output);
                    if !report.mismatched_splits.is_empty() {
                        warn!(
                            "Image/label count mismatch in: {}",
                            report.mismatched_splits.join(", ")
                        );
                    }
                    if cli.json {
                        print_json(&report);
                    }
                }
                Err(e) => {
                    error!("Merge failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }

        Command::Check(args) => {
            let report = check(&args.images, &args.labels);
            info!(
                "Valid pairs: {} | orphan images: {} | orphan labels: {}",
                report.valid_pairs,
                report.orphan_images.len(),
                report.orphan_labels.len()
            );
            for base in report.orphan_images.iter().take(5) {
                info!("  orphan image: {}", base);
            }
            for base in report.orphan_labels.iter().take(5) {
                info!("  orphan label: {}", base);
            }
            if cli.json {
                print_json(&report);
            }
            if report.is_clean() {
                info!("Integrity check passed.");
            } else if let Some(fix) = args.fix {
                let mode = match fix {
                    FixMode::Images => RepairMode::Images,
                    FixMode::Labels => RepairMode::Labels,
                    FixMode::All => RepairMode::All,
                };
                let deleted =
                    remove_orphans(&args.images, &args.labels, &report, mode, confirm.as_ref());
                info!("Removed {} orphan file(s).", deleted);
            }
        }

        Command::Pipeline(args) => {
            if args.train_ratio + args.val_ratio > 1.0 {
                error!("train-ratio + val-ratio must not exceed 1.0");
                return ExitCode::FAILURE;
            }
            let (r, g, b) = args.occlusion_color;
            let config = PipelineConfig {
                categories: args.categories,
                split: SplitConfig {
                    train_ratio: args.train_ratio,
                    val_ratio: args.val_ratio,
                    cap: args.cap,
                },
                brightness_factors: args.brightness_factors,
                blur_radius: args.blur_radius,
                occlusion: OcclusionConfig {
                    ratios: args.occlusion_ratios,
                    color: image::Rgb([r, g, b]),
                },
            };
            run_pipeline(&args.base_dir, &config, &mut rng, confirm.as_ref());
        }

        Command::Stress(args) => {
            let stages = stress_stages(&args);
            if stages.is_empty() {
                error!("No stages selected; pass --occlude, --brightness or --blur.");
                return ExitCode::FAILURE;
            }
            match generate_stress_set(&args.source, &args.output, &stages, &mut rng) {
                Ok(report) => {
                    report.log_summary("stress");
                    if cli.json {
                        print_json(&report);
                    }
                }
                Err(e) => {
                    error!("Stress set generation failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_brightness(args: &BrightnessArgs, rng: &mut StdRng) -> BatchReport {
    let image_dir = args.target.root.join(&args.target.split).join("images");
    let label_dir = args.target.root.join(&args.target.split).join("labels");
    let options = BatchOptions {
        exclude_containing: if args.include_augmented {
            None
        } else {
            Some("_bright".to_string())
        },
    };

    if let Some(per_image) = args.random {
        return run_random_brightness(
            &image_dir,
            &label_dir,
            per_image,
            (args.min_factor, args.max_factor),
            &options,
            rng,
        );
    }

    // Fixed mode: one full pass per factor, totals accumulated
    let mut total = BatchReport::default();
    for &factor in &args.factors {
        let stage = AugmentStage::Brightness { factor };
        let report = run_stage(&stage, &image_dir, &label_dir, &options, rng);
        report.log_summary(&format!("brightness({})", factor));
        total.input_count = report.input_count;
        total.created += report.created;
        total.skipped += report.skipped;
        total.failed += report.failed;
    }
    total.finish()
}

fn stress_stages(args: &StressArgs) -> Vec<AugmentStage> {
    let mut stages = Vec::new();
    if args.occlude {
        let (r, g, b) = args.occlusion_color;
        stages.push(AugmentStage::Occlusion {
            config: OcclusionConfig {
                ratios: args.occlusion_ratios.clone(),
                color: image::Rgb([r, g, b]),
            },
        });
    }
    if let Some(factor) = args.brightness {
        stages.push(AugmentStage::Brightness { factor });
    }
    if let Some(radius) = args.blur {
        stages.push(AugmentStage::Blur { radius });
    }
    stages
}
