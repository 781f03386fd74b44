use anyhow::{Context, Result};
use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use steer_client::{
    injector::LogInjector, run, signal, Config, DetectorProcess, FrameDisplay, Headless,
    JsonLinesSource, KeyGuard, LandmarkSource, RunSummary,
};
use steer_core::{ClassifierConfig, FrameSize, KeySink, SteeringPipeline};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a game with hand gestures", long_about = None)]
struct Args {
    /// Landmark stream (one JSON frame per line), or '-' for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Command that runs the hand detector and prints JSON frames on stdout
    #[arg(long, conflicts_with = "input")]
    detector_cmd: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log key edges instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Steering dead zone in pixels
    #[arg(long)]
    dead_zone: Option<f32>,

    /// Width of the frames the detector works on
    #[arg(long)]
    frame_width: Option<u32>,

    /// Height of the frames the detector works on
    #[arg(long)]
    frame_height: Option<u32>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Show preview window (press 'q' in it to quit)
    #[arg(short = 'w', long)]
    show_window: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(dead_zone) = self.dead_zone {
            config.classifier.dead_zone_px = dead_zone;
        }
        if let Some(width) = self.frame_width {
            config.frame.width = width;
        }
        if let Some(height) = self.frame_height {
            config.frame.height = height;
        }

        config.validate()?;
        Ok(config)
    }
}

fn open_source(args: &Args) -> Result<Box<dyn LandmarkSource>> {
    match &args.detector_cmd {
        Some(command) => Ok(Box::new(DetectorProcess::spawn(command)?)),
        None => {
            log::info!("Reading landmarks from {}", args.input);
            Ok(Box::new(JsonLinesSource::open(&args.input)?))
        }
    }
}

fn open_display(show_window: bool, frame: FrameSize) -> Result<Box<dyn FrameDisplay>> {
    if !show_window {
        return Ok(Box::new(Headless));
    }

    #[cfg(feature = "preview")]
    {
        let window = steer_client::preview::PreviewWindow::new(frame)
            .context("Failed to open preview window")?;
        Ok(Box::new(window))
    }
    #[cfg(not(feature = "preview"))]
    {
        let _ = frame;
        log::warn!("Built without the `preview` feature, ignoring --show-window");
        Ok(Box::new(Headless))
    }
}

fn drive<S>(args: &Args, config: &Config, sink: S) -> Result<RunSummary>
where
    S: KeySink,
    S::Error: fmt::Display,
{
    let stop = signal::watch_ctrl_c()?;
    let mut source = open_source(args)?;
    let mut display = open_display(args.show_window, config.frame)?;

    let pipeline = SteeringPipeline::new(ClassifierConfig::from(config.classifier), config.frame);
    let guard = KeyGuard::new(pipeline, sink);

    run(source.as_mut(), guard, display.as_mut(), &stop, args.max_frames)
}

#[cfg(feature = "inject")]
fn drive_live(args: &Args, config: &Config) -> Result<RunSummary> {
    let injector = steer_client::injector::EnigoInjector::new(config.bindings)?;
    drive(args, config, injector)
}

#[cfg(not(feature = "inject"))]
fn drive_live(args: &Args, config: &Config) -> Result<RunSummary> {
    log::warn!("Built without the `inject` feature, running as a dry run");
    drive(args, config, LogInjector::new(config.bindings))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = args.load_config().context("Failed to load configuration")?;
    if args.print_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    log::info!("Virtual steering starting...");
    log::info!(
        "Frame: {}x{}, dead zone: {}px",
        config.frame.width,
        config.frame.height,
        config.classifier.dead_zone_px
    );

    let summary = if args.dry_run {
        drive(&args, &config, LogInjector::new(config.bindings))
    } else {
        drive_live(&args, &config)
    }
    .context("Steering loop error")?;

    log::info!(
        "Stopped after {} frames ({:?}), released {} key(s)",
        summary.frames,
        summary.stop,
        summary.released
    );

    Ok(())
}
