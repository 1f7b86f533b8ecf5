//! pantilt - pan/tilt camera mount
//! Command-line interface for centering, recording sweeps, photos and streaming

use clap::{Parser, Subcommand};
use colored::*;
use pantilt_actuator::circle_path;
use pantilt_orchestration::{Axis, MountConfig, MountController, Rig, SimulatedRig};
use pantilt_photonic::{FrameStreamer, frame_marker};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pantilt")]
#[command(author = "Silvano Neto")]
#[command(version = "2026.10.1")]
#[command(about = "Pan/tilt camera mount control", long_about = None)]
struct Cli {
    /// Mount configuration (TOML)
    #[arg(short, long, value_name = "FILE", env = "PANTILT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Drive real PWM pins (requires the `rpi` feature)
    #[arg(long, global = true)]
    hardware: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move both axes to their center angle
    Center,

    /// Record a video while panning
    Pan {
        #[arg(long, default_value_t = 240)]
        width: u32,
        #[arg(long, default_value_t = 320)]
        height: u32,
        /// Output file (raw H.264)
        #[arg(short, long, default_value = "video_pan.h264")]
        output: PathBuf,
    },

    /// Record a video while tilting
    Tilt {
        #[arg(long, default_value_t = 240)]
        width: u32,
        #[arg(long, default_value_t = 320)]
        height: u32,
        /// Output file (raw H.264)
        #[arg(short, long, default_value = "video_tilt.h264")]
        output: PathBuf,
    },

    /// Take a single photo
    Photo {
        #[arg(long, default_value_t = 720)]
        width: u32,
        #[arg(long, default_value_t = 960)]
        height: u32,
        /// Output file (JPEG)
        #[arg(short, long, default_value = "photo.jpg")]
        output: PathBuf,
    },

    /// Trace a circle with both axes
    Circle {
        /// Radius in degrees
        #[arg(short, long, default_value_t = 30.0)]
        radius: f64,
        /// Points per turn
        #[arg(short, long, default_value_t = 72)]
        points: usize,
        /// Pause between points (ms)
        #[arg(long, default_value_t = 20)]
        pause_ms: u64,
    },

    /// Stream frames and report the latest one
    Stream {
        #[arg(long, default_value_t = 320)]
        width: u32,
        #[arg(long, default_value_t = 240)]
        height: u32,
        /// Streaming time in seconds
        #[arg(short, long, default_value_t = 3)]
        seconds: u64,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pantilt_orchestration=info,pantilt_photonic=info,pantilt_actuator=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "command failed");
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let mut rig = open_rig(cli.hardware)?;
    let mut mount = MountController::open(&config, rig.as_mut())?;

    let result = match &cli.command {
        Commands::Center => center_command(&mut mount),
        Commands::Pan { width, height, output } => record_command(&mut mount, Axis::Pan, *width, *height, output),
        Commands::Tilt { width, height, output } => record_command(&mut mount, Axis::Tilt, *width, *height, output),
        Commands::Photo { width, height, output } => photo_command(&mut mount, *width, *height, output),
        Commands::Circle { radius, points, pause_ms } => {
            circle_command(&mut mount, *radius, *points, Duration::from_millis(*pause_ms))
        }
        Commands::Stream { width, height, seconds } => {
            stream_command(&mount, *width, *height, Duration::from_secs(*seconds))
        }
    };

    mount.cleanup();
    tracing::debug!(ok = result.is_ok(), "mount released");
    result
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MountConfig> {
    let config = match path {
        Some(path) => MountConfig::from_file(path)?,
        None => MountConfig::default(),
    };
    let config = config.with_env_overrides()?;
    tracing::info!(
        source = %path.map_or_else(|| "defaults".to_string(), |p| p.display().to_string()),
        step_resolution = config.pan.step_resolution,
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(feature = "rpi")]
fn hardware_rig() -> anyhow::Result<Box<dyn Rig>> {
    Ok(Box::new(pantilt_orchestration::HardwareRig::new()))
}

#[cfg(not(feature = "rpi"))]
fn hardware_rig() -> anyhow::Result<Box<dyn Rig>> {
    anyhow::bail!("built without the `rpi` feature; rebuild with --features rpi")
}

fn open_rig(hardware: bool) -> anyhow::Result<Box<dyn Rig>> {
    if hardware {
        tracing::info!("using hardware rig");
        hardware_rig()
    } else {
        tracing::info!("using simulated rig");
        println!("{} simulated rig", "Using".yellow().bold());
        Ok(Box::new(SimulatedRig::new()))
    }
}

fn center_command(mount: &mut MountController) -> anyhow::Result<()> {
    mount.center()?;
    println!("{} pan and tilt", "Centered".green().bold());
    Ok(())
}

fn record_command(mount: &mut MountController, axis: Axis, width: u32, height: u32, output: &Path) -> anyhow::Result<()> {
    println!(
        "{} {}x{} while sweeping {}",
        "Recording".green().bold(),
        width,
        height,
        axis.as_str().cyan()
    );
    mount.record_sweep(axis, width, height, output)?;
    println!("{} {}", "   Created".green().bold(), output.display().to_string().cyan());
    Ok(())
}

fn photo_command(mount: &mut MountController, width: u32, height: u32, output: &Path) -> anyhow::Result<()> {
    mount.center()?;
    mount.capture_photo(width, height, output)?;
    println!("{} {}", "   Created".green().bold(), output.display().to_string().cyan());
    Ok(())
}

fn circle_command(mount: &mut MountController, radius: f64, points: usize, pause: Duration) -> anyhow::Result<()> {
    mount.center()?;
    println!("{} circle of {}° in {} points", "Tracing".green().bold(), radius, points);
    for (i, (x, y)) in circle_path(radius, points).enumerate() {
        tracing::debug!(point = i, x, y, "circle point");
        mount.position(x, y)?;
        thread::sleep(pause);
    }
    mount.center()?;
    Ok(())
}

fn stream_command(mount: &MountController, width: u32, height: u32, duration: Duration) -> anyhow::Result<()> {
    let mut streamer = FrameStreamer::new(mount.camera()?.clone());
    streamer.start(width, height)?;
    println!("{} {}x{}", "Streaming".green().bold(), width, height);

    let started = Instant::now();
    while started.elapsed() < duration {
        if let Some(frame) = streamer.latest_frame() {
            println!(
                "  frame #{:<6} {}x{}  avg intensity {}",
                frame_marker(frame.as_bytes()),
                frame.width,
                frame.height,
                frame.avg_intensity()
            );
        }
        thread::sleep(Duration::from_millis(250));
    }

    streamer.stop();
    let frames = streamer.join()?;
    tracing::info!(frames, elapsed_ms = started.elapsed().as_millis() as u64, "stream finished");
    println!("{} after {} frames", "Stopped".green().bold(), frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pantilt", "photo", "--hardware", "-o", "shot.jpg"]).unwrap();
        assert!(cli.hardware);
        match cli.command {
            Commands::Photo { width, height, output } => {
                assert_eq!((width, height), (720, 960));
                assert_eq!(output, PathBuf::from("shot.jpg"));
            }
            _ => panic!("expected photo"),
        }
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/pantilt.toml"))).is_err());
    }

    #[test]
    fn test_simulated_rig_opens_mount() {
        let mut rig = open_rig(false).unwrap();
        let mut mount = MountController::open(&MountConfig::default(), rig.as_mut()).unwrap();
        mount.cleanup();
    }
}
