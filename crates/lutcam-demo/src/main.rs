//! Lutcam demo: grade raw camera dumps from the command line.
//!
//! Reads tightly packed I420, NV12 or NV21 frames, grades each one through
//! a filter from a `.cube` directory and writes the NV12 result, optionally
//! saving the first graded frame as a PNG preview.

mod config;
mod frame_loader;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use lutcam_core::{
    ChromaLayout, FilterRegistry, FrameLayout, FrameProcessor, PtsNormalizer, RgbaFrame,
};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, Cli};
use frame_loader::{FrameReader, load_layout, save_layout, sidecar_path};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::default().with_cli(&cli);

    let registry = build_registry(&config)?;
    if cli.list {
        for entry in registry.entries() {
            println!("{}\t{}", entry.name, entry.label);
        }
        return Ok(());
    }

    let Some(input) = cli.input.as_deref() else {
        bail!("no input file given");
    };
    let layout = resolve_layout(&cli, input)?;

    let processor = FrameProcessor::new(Arc::new(registry));
    processor
        .select_filter(&config.filter)
        .with_context(|| format!("cannot select filter `{}`", config.filter))?;

    let frames = grade_file(
        &processor,
        layout,
        input,
        cli.output.as_deref(),
        cli.preview.as_deref(),
        &config,
    )?;
    tracing::info!(
        "graded {frames} {}x{} frames with filter `{}`",
        layout.width,
        layout.height,
        processor.registry().active_name()
    );
    Ok(())
}

fn build_registry(config: &AppConfig) -> Result<FilterRegistry> {
    let mut registry = FilterRegistry::new();
    if let Some(dir) = &config.lut_dir {
        registry
            .load_dir(dir)
            .with_context(|| format!("failed to read LUT directory {}", dir.display()))?;
    }
    Ok(registry)
}

/// Layout from `--layout`, from `--width`/`--height`, or from a
/// `<input>.json` sidecar next to the input.
fn resolve_layout(cli: &Cli, input: &Path) -> Result<FrameLayout> {
    let layout = if let Some(path) = &cli.layout {
        load_layout(path).with_context(|| format!("failed to load layout {}", path.display()))?
    } else if let (Some(width), Some(height)) = (cli.width, cli.height) {
        FrameLayout {
            width,
            height,
            chroma: cli.chroma.unwrap_or(ChromaLayout::I420),
        }
    } else {
        let sidecar = sidecar_path(input);
        load_layout(&sidecar).with_context(|| {
            format!(
                "no --width/--height given and no layout at {}",
                sidecar.display()
            )
        })?
    };

    layout
        .frame_len()
        .with_context(|| format!("unusable {} layout", layout.chroma))?;
    Ok(layout)
}

/// Grade every frame of `input`. Returns the number of frames processed.
fn grade_file(
    processor: &FrameProcessor,
    layout: FrameLayout,
    input: &Path,
    output: Option<&Path>,
    preview: Option<&Path>,
    config: &AppConfig,
) -> Result<u64> {
    let mut reader = FrameReader::open(input, layout)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let mut sink = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(BufWriter::new(file))
        }
        None => None,
    };

    let mut nv12 = vec![0u8; layout.frame_len()?];
    let mut clock = PtsNormalizer::new();
    let interval_ns = config.frame_interval_ns();
    let mut preview = preview;
    let mut index: u64 = 0;

    while let Some(frame) = reader.next_frame()? {
        let planes = layout.planes(frame)?;
        let rgba = processor
            .process(&planes, &mut nv12)
            .with_context(|| format!("failed to grade frame {index}"))?;

        let capture_ns = i64::try_from(index)?.saturating_mul(interval_ns);
        let pts_us = clock.next_pts(capture_ns);
        tracing::debug!(frame = index, pts_us, "graded frame");

        if let Some(sink) = sink.as_mut() {
            sink.write_all(&nv12)?;
        }
        if let Some(path) = preview.take() {
            save_preview(rgba, path)?;
        }
        index += 1;
    }

    if let (Some(mut sink), Some(path)) = (sink, output) {
        sink.flush()?;
        let sidecar = sidecar_path(path);
        let out_layout = FrameLayout {
            chroma: ChromaLayout::Nv12,
            ..layout
        };
        save_layout(&out_layout, &sidecar)
            .with_context(|| format!("failed to write {}", sidecar.display()))?;
        tracing::info!("wrote {} ({})", path.display(), sidecar.display());
    }

    Ok(reader.frames_read())
}

fn save_preview(rgba: RgbaFrame, path: &Path) -> Result<()> {
    let image = rgba
        .into_image()
        .context("graded frame does not match its dimensions")?;
    image
        .save(path)
        .with_context(|| format!("failed to write preview {}", path.display()))?;
    tracing::info!("wrote preview {}", path.display());
    Ok(())
}
