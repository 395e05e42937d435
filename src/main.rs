use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, terminal};

use handbloom::camera::{CameraSettings, CameraSource, StreamBackend};
use handbloom::classifier::{GestureClient, GEMINI_API_KEY_ENV};
use handbloom::config::Config;
use handbloom::engine::ParticleEngine;
use handbloom::event_loop;
use handbloom::gesture::GestureState;
use handbloom::input::PointerCell;
use handbloom::render::{Surface, TerminalSurface};
use handbloom::sampler::GestureSampler;

/// Parse and validate the sampling interval (100-10000 ms)
fn parse_interval_ms(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid interval", s))?;
    if !(100..=10_000).contains(&ms) {
        return Err(format!(
            "Interval must be between 100 and 10000 ms, got {}",
            ms
        ));
    }
    Ok(ms)
}

/// Parse and validate the particle count (1-20000)
fn parse_particles(s: &str) -> Result<usize, String> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid particle count", s))?;
    if !(1..=20_000).contains(&count) {
        return Err(format!(
            "Particle count must be between 1 and 20000, got {}",
            count
        ));
    }
    Ok(count)
}

/// handbloom: gesture-driven particle field for the terminal
#[derive(Parser)]
#[command(name = "handbloom")]
#[command(version, about = "Gesture-driven particle field for the terminal")]
#[command(long_about = "Renders an animated particle field in the terminal. \
    Show your camera an open hand and the particles drift; make a fist and \
    they bloom into a flower around the mouse pointer. Hold space to force \
    the fist gesture without a camera.")]
#[command(after_help = "EXAMPLES:
    # Run with defaults
    handbloom

    # Use the second camera and a denser field
    handbloom --device 1 --particles 2000

    # Run without a camera (space key only)
    handbloom --no-camera

    # List available cameras
    handbloom list-cameras

KEYS (while running):
    space (hold)  Force the fist gesture
    mouse move    Move the flower anchor
    r             Retry camera acquisition
    q / Esc       Quit

ENVIRONMENT:
    GEMINI_API_KEY   API key for gesture classification (.env supported).
                     Without it the field stays in drift mode unless space
                     is held.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Custom config file path (default: ~/.config/handbloom/config.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Camera device index to use
    #[arg(long, short = 'd')]
    device: Option<u32>,

    /// Gesture sampling interval in milliseconds (100-10000)
    #[arg(long, value_parser = parse_interval_ms)]
    interval_ms: Option<u64>,

    /// Number of particles (1-20000)
    #[arg(long, short = 'p', value_parser = parse_particles)]
    particles: Option<usize>,

    /// Disable the camera; gesture comes from the space key only
    #[arg(long)]
    no_camera: bool,

    /// Do not mirror the camera image
    #[arg(long)]
    no_mirror: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available camera devices
    ListCameras,
}

#[cfg(feature = "camera")]
fn stream_backend() -> Arc<dyn StreamBackend> {
    Arc::new(handbloom::camera::NokhwaBackend)
}

#[cfg(not(feature = "camera"))]
fn stream_backend() -> Arc<dyn StreamBackend> {
    use handbloom::camera::{DeviceInfo, VideoStream};

    struct DisabledBackend;

    impl StreamBackend for DisabledBackend {
        fn list_devices(&self) -> Result<Vec<DeviceInfo>, String> {
            Ok(vec![])
        }

        fn open(
            &self,
            _request: &handbloom::camera::StreamRequest,
            _settings: &CameraSettings,
        ) -> Result<Box<dyn VideoStream>, String> {
            Err("camera support not compiled in".to_string())
        }
    }

    Arc::new(DisabledBackend)
}

fn run_list_cameras() -> Result<(), String> {
    let backend = stream_backend();
    let devices = backend.list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }
    println!("Available cameras:\n");
    for device in &devices {
        println!("  {}", device);
    }
    Ok(())
}

/// Restores the terminal on drop, so a panic or early return cannot leave
/// raw mode or mouse capture behind.
struct TerminalGuard {
    keyboard_enhanced: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        // Key-release events need the kitty keyboard protocol. Probe for it
        // first: terminals without it get press-to-toggle override
        // semantics instead of hold-to-fist.
        let keyboard_enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        Ok(Self { keyboard_enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.keyboard_enhanced {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            stdout,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::load(cli.config.as_deref())?;

    // CLI args > config file > built-in defaults
    let device = cli.device.or(config.camera.device);
    let interval =
        Duration::from_millis(cli.interval_ms.unwrap_or(config.sampler.interval_ms));
    let particles = cli.particles.unwrap_or(config.engine.particles);
    let mirror = config.camera.mirror && !cli.no_mirror;

    let client = Arc::new(GestureClient::from_env()?);
    if !client.has_api_key() && !cli.no_camera {
        eprintln!("Warning: {} not set.", GEMINI_API_KEY_ENV);
        eprintln!("         Gestures will not be classified; hold space for the flower.\n");
    }

    let settings = CameraSettings {
        device_index: device,
        mirror,
        ..CameraSettings::default()
    };
    let mut camera = CameraSource::new(stream_backend(), settings);
    if !cli.no_camera {
        camera.start();
    }

    let gesture = GestureState::new();
    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let mut surface = TerminalSurface::new(cols, rows);
    let mut engine = ParticleEngine::new(particles);
    let pointer = PointerCell::centered(surface.width(), surface.height());

    let sampler = GestureSampler::new(camera.handle(), client, gesture.clone(), interval);
    let sampler_shutdown = sampler.shutdown_handle();

    let guard = TerminalGuard::enter()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        let sampler_task = tokio::spawn(sampler.run());
        let result = event_loop::run(
            &mut engine,
            &mut surface,
            gesture,
            pointer,
            &mut camera,
            guard.keyboard_enhanced,
        )
        .await;
        sampler_shutdown.store(true, Ordering::SeqCst);
        sampler_task.abort();
        result
    });

    camera.stop();
    drop(guard);

    result
}

fn main() {
    // Load .env before reading any keys; don't override existing env vars.
    let _ = dotenv::dotenv();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListCameras) => {
            if let Err(e) = run_list_cameras() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = run(cli) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
