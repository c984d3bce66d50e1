//! Color a raster map image: segment near-white regions, build their
//! adjacency graph, assign at most four colors, repaint, and write the
//! result back out as a 24-bit BMP.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use kartta_pipeline::{EventSink, NullSink, PipelineConfig, PipelineEvent, process_staged};

/// Color a raster map image with at most four colors.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input map image (24-bit uncompressed BMP).
    input: PathBuf,

    /// Output path for the colored BMP.
    output: PathBuf,

    /// Write a line-per-event audit log to this file.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Channel threshold for region-interior (near-white) pixels; a pixel
    /// belongs to a region iff all three channels exceed this value.
    #[arg(long, default_value_t = 250)]
    threshold: u8,

    /// Maximum number of region colors.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=4))]
    max_colors: u8,

    /// Print the per-stage diagnostics report.
    #[arg(long)]
    report: bool,
}

/// File-backed event sink: renders each pipeline event as one log line.
///
/// The log is a write-only side channel; a failed write is dropped rather
/// than aborting the run.
struct FileSink {
    writer: BufWriter<File>,
}

impl EventSink for FileSink {
    fn record(&mut self, event: PipelineEvent) {
        writeln!(self.writer, "{event}").ok();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = PipelineConfig {
        white_threshold: args.threshold,
        max_colors: args.max_colors,
        ..PipelineConfig::default()
    };

    let mut sink: Box<dyn EventSink> = match &args.log {
        Some(path) => Box::new(FileSink {
            writer: BufWriter::new(File::create(path)?),
        }),
        None => Box::new(NullSink),
    };

    eprintln!("Reading map from {}", args.input.display());
    let bytes = std::fs::read(&args.input)?;

    let staged = process_staged(&bytes, &config, sink.as_mut())?;

    eprintln!("Writing colored map to {}", args.output.display());
    std::fs::write(&args.output, staged.recolored.encode())?;

    let summary = &staged.diagnostics.summary;
    println!(
        "{}x{} pixels, {} regions, {} edges, {} colors used",
        summary.image_width,
        summary.image_height,
        summary.region_count,
        summary.edge_count,
        summary.colors_used,
    );
    if summary.fallback_count > 0 {
        println!(
            "warning: {} region(s) exceeded the {}-color limit; \
             adjacent same-color regions are possible in the output",
            summary.fallback_count, args.max_colors,
        );
    }
    if staged.paint_stats.substituted_pixels > 0 {
        println!(
            "warning: {} pixel(s) painted with the fallback palette entry",
            staged.paint_stats.substituted_pixels,
        );
    }

    if args.report {
        println!("{}", staged.diagnostics.report());
    }

    Ok(())
}
