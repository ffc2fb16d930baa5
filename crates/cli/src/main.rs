use std::path::PathBuf;
use std::process;

use clap::Parser;

use setspotter_core::io::image_file::{read_frame, write_frame};
use setspotter_core::{FrameProcessor, DEFAULT_MAX_WORKERS};

/// Finds Sets, the card game, in a photo of the table.
#[derive(Parser)]
#[command(name = "setspotter")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Output file for the annotated image (required unless --count-only).
    output: Option<PathBuf>,

    /// Worker threads for symbol classification.
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    workers: usize,

    /// Count Sets without drawing them.
    #[arg(long)]
    no_highlight: bool,

    /// Print the Set count only; no output image is written.
    #[arg(long)]
    count_only: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let frame = read_frame(&cli.input, 0)?;
    log::info!(
        "Loaded {} ({}x{})",
        cli.input.display(),
        frame.width(),
        frame.height()
    );

    let mut processor = FrameProcessor::new(cli.workers)?;
    if cli.no_highlight || cli.count_only {
        processor.set_show_sets(false);
    }

    let annotated = processor.process(&frame)?;
    println!("{}", processor.num_sets_in_frame());

    if let Some(output) = cli.output {
        write_frame(&output, &annotated)?;
        log::info!("Output written to {}", output.display());
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if cli.count_only && cli.output.is_some() {
        return Err("--count-only does not take an output file".into());
    }
    if !cli.count_only && cli.output.is_none() {
        return Err("Output file is required unless --count-only is used".into());
    }
    Ok(())
}
