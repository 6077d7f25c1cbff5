// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagesquare: command-line front end.
//
// A thin shim over pagesquare-imaging: reads files, maps flags onto
// `Operations` and `PipelineConfig`, and writes PNG output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::DynamicImage;
use pagesquare_core::human_errors::humanize_error;
use pagesquare_core::{Operations, PagesquareError, PipelineConfig};
use pagesquare_imaging::{
    ImageProcessor, Pipeline, ScannedPdfRasterizer, detect_document_edges, list_templates,
    prepare_pages,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Turn photos and scanned PDF pages into square social-media images.
#[derive(Parser, Debug)]
#[command(name = "pagesquare", version, arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the image pipeline on one file.
    Process {
        /// Input image (PNG, JPEG, ...).
        input: PathBuf,

        /// Where to write the resulting PNG.
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with the operations to apply.
        #[arg(long, conflicts_with = "ops_json")]
        ops: Option<PathBuf>,

        /// Operations as an inline JSON object, e.g. '{"grayscale": true}'.
        #[arg(long)]
        ops_json: Option<String>,

        /// Pipeline configuration JSON file.
        #[arg(long, env = "PAGESQUARE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Look for a document outline and print its corners.
    Detect {
        input: PathBuf,

        /// Also write the edge/corner overlay to this PNG.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, env = "PAGESQUARE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List the available decorative templates.
    Templates,

    /// Extract every page of a scanned PDF as a square PNG.
    Pages {
        pdf: PathBuf,

        /// Output directory; created if missing.
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, env = "PAGESQUARE_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Process {
            input,
            output,
            ops,
            ops_json,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let ops = load_operations(ops.as_deref(), ops_json.as_deref())?;
            let raw = read(&input)?;

            let png = Pipeline::new(config)
                .process(&raw, &ops)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            write(&output, &png)?;
            info!(output = %output.display(), bytes = png.len(), "Wrote processed image");
        }

        Command::Detect {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let image = ImageProcessor::from_bytes(&read(&input)?)
                .with_context(|| format!("Failed to decode {}", input.display()))?;

            match detect_document_edges(image.as_dynamic(), &config) {
                Some(detection) => {
                    let corners = serde_json::to_string_pretty(&detection.corners.ordered())
                        .context("Failed to serialise corners")?;
                    println!("{corners}");
                    if let Some(output) = output {
                        let png = ImageProcessor::from_dynamic(DynamicImage::ImageRgba8(
                            detection.visualization,
                        ))
                        .to_png_bytes()?;
                        write(&output, &png)?;
                    }
                }
                None => println!("no document found"),
            }
        }

        Command::Templates => {
            for template in list_templates() {
                println!("{:<10} {}", template.name, template.description);
            }
        }

        Command::Pages {
            pdf,
            output,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let bytes = read(&pdf)?;
            let pages = prepare_pages(&ScannedPdfRasterizer, &bytes, &config)
                .with_context(|| format!("Failed to prepare pages of {}", pdf.display()))?;

            fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            for (index, png) in pages.iter().enumerate() {
                write(&output.join(page_file_name(index)), png)?;
            }
            info!(pages = pages.len(), output = %output.display(), "Wrote page images");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load_operations(file: Option<&Path>, inline: Option<&str>) -> Result<Operations> {
    let json = match (file, inline) {
        (Some(path), _) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read operations from {}", path.display()))?,
        (None, Some(json)) => json.to_owned(),
        (None, None) => return Ok(Operations::default()),
    };
    Operations::from_json(&json).context("Invalid operations JSON")
}

fn page_file_name(index: usize) -> String {
    format!("page-{:03}.png", index + 1)
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Print the failure, with a friendlier explanation when it came from the
/// pipeline itself.
fn report(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
    if let Some(pipeline_err) = err.downcast_ref::<PagesquareError>() {
        let human = humanize_error(pipeline_err);
        eprintln!("{}", human.message);
        eprintln!("hint: {}", human.suggestion);
    }
}
