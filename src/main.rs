//! agent-orb viewer
//!
//! Opens a window showing one orb over a dark backdrop.
//!
//! # Keyboard Shortcuts
//!
//! - 1-5: idle, listening, thinking, speaking, asleep
//! - Space: next preset
//! - R: Toggle reflections
//! - F: Log FPS
//! - S: Save config
//! - ESC: Quit

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use sdl2::keyboard::Keycode;

use agent_orb::display::{Display, InputEvent, RenderTarget};
use agent_orb::remote::{self, RemoteControl};
use agent_orb::util::FrameClock;
use agent_orb::{
    create_backend, run, BackendKind, ConfigPatch, FrameHost, Orb, OrbConfig, PixelBuffer,
    Preset, ReflectionSetting, StepPolicy,
};

const DEFAULT_CONFIG_PATH: &str = "orb.json";
const BACKDROP_TOP: (u8, u8, u8) = (18, 20, 28);
const BACKDROP_BOTTOM: (u8, u8, u8) = (6, 7, 10);

#[derive(Parser)]
#[command(name = "agent-orb")]
#[command(author, version, about = "Animated agent-state orb viewer")]
struct Args {
    /// JSON config file to load (and save with S)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Starting preset: idle, listening, thinking, speaking or asleep
    #[arg(long, short = 'p')]
    preset: Option<Preset>,

    /// Global hex color, e.g. "#2563eb"
    #[arg(long)]
    color: Option<String>,

    /// Logical size in points
    #[arg(long, short = 's')]
    size: Option<u32>,

    /// Enable glass reflections, optionally at an intensity in [0, 1]
    #[arg(long, value_name = "INTENSITY", num_args = 0..=1, default_missing_value = "0.6")]
    reflections: Option<f32>,

    /// Transition speed multiplier
    #[arg(long)]
    transition_speed: Option<f32>,

    /// Step the transition once per frame instead of by elapsed time
    #[arg(long)]
    fixed_step: bool,

    /// Shade on the main thread
    #[arg(long)]
    sequential: bool,

    /// Shading threads (0 = one per core)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Disable VSync for uncapped framerate
    #[arg(long)]
    no_vsync: bool,

    // === Remote control ===
    /// MQTT broker host; enables remote preset control
    #[arg(long)]
    mqtt_host: Option<String>,

    #[arg(long, default_value_t = remote::DEFAULT_PORT)]
    mqtt_port: u16,

    #[arg(long, default_value = remote::DEFAULT_TOPIC)]
    mqtt_topic: String,
}

impl Args {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Config file (if any) with command-line overrides on top
    fn load_config(&self) -> Result<OrbConfig> {
        let mut config = match &self.config {
            Some(path) if path.exists() => OrbConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            Some(path) => {
                log::info!("{} does not exist yet, starting from defaults", path.display());
                OrbConfig::default()
            },
            None => OrbConfig::default(),
        };

        if let Some(size) = self.size {
            config.size = size;
            config.width = None;
            config.height = None;
        }
        config.apply(&ConfigPatch {
            preset: self.preset,
            color: self.color.clone(),
            transition_speed: self.transition_speed,
            reflections: self.reflections.map(ReflectionSetting::enabled),
            ..ConfigPatch::default()
        });
        Ok(config)
    }
}

struct Viewer<'a> {
    display: Display,
    target: RenderTarget<'a>,
    backdrop: PixelBuffer,
    orb_layer: PixelBuffer,
    frame: PixelBuffer,
    clock: FrameClock,
    remote: Option<RemoteControl>,
    config_path: PathBuf,
}

impl Viewer<'_> {
    fn handle_key(&mut self, key: Keycode, orb: &mut Orb) {
        let preset_slot = match key {
            Keycode::Num1 => Some(0),
            Keycode::Num2 => Some(1),
            Keycode::Num3 => Some(2),
            Keycode::Num4 => Some(3),
            Keycode::Num5 => Some(4),
            _ => None,
        };
        if let Some(slot) = preset_slot {
            orb.set_preset(Preset::ALL[slot]);
            return;
        }

        match key {
            Keycode::Space => orb.set_preset(orb.config().preset.next()),
            Keycode::R => {
                let reflections = orb.config().reflections.toggled();
                log::info!("reflections {:?}", reflections);
                orb.apply_patch(&ConfigPatch {
                    reflections: Some(reflections),
                    ..ConfigPatch::default()
                });
            },
            Keycode::F => {
                let (min_fps, max_fps) = self.clock.min_max_fps();
                log::info!(
                    "FPS {} avg  {} min  {} max  {}ms",
                    self.clock.avg_fps() as u32,
                    min_fps as u32,
                    max_fps as u32,
                    self.clock.avg_frame_time_ms() as u32
                );
            },
            Keycode::S => save_config(orb.config(), &self.config_path),
            _ => {},
        }
    }
}

impl FrameHost for Viewer<'_> {
    fn begin_frame(&mut self, orb: &mut Orb) -> Option<f32> {
        let dt = self.clock.tick();

        for event in self.display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => return None,
                InputEvent::KeyDown(key) => self.handle_key(key, orb),
            }
        }

        if let Some(patch) = self.remote.as_ref().and_then(RemoteControl::poll) {
            orb.apply_patch(&patch);
        }

        Some(dt)
    }

    fn surface(&mut self) -> &mut PixelBuffer {
        &mut self.orb_layer
    }

    fn end_frame(&mut self) -> agent_orb::Result<()> {
        self.frame.as_bytes_mut().copy_from_slice(self.backdrop.as_bytes());
        self.frame.composite_premultiplied(&self.orb_layer);
        self.display.present(&mut self.target, &self.frame)
    }
}

fn save_config(config: &OrbConfig, path: &Path) {
    match config.save(path) {
        Ok(()) => log::info!("config saved to {}", path.display()),
        Err(e) => log::error!("failed to save {}: {}", path.display(), e),
    }
}

fn run_viewer(args: &Args) -> Result<()> {
    let config = args.load_config()?;
    let (width, height) = config.logical_size();
    let (render_width, render_height) = config.render_size();

    let backend_kind = if args.sequential {
        BackendKind::Sequential
    } else {
        BackendKind::Parallel {
            threads: args.threads,
        }
    };
    let backend = create_backend(backend_kind).context("failed to start shading backend")?;

    let remote = match &args.mqtt_host {
        Some(host) => Some(
            RemoteControl::connect(host, args.mqtt_port, &args.mqtt_topic)
                .context("failed to start remote control")?,
        ),
        None => None,
    };

    let (display, texture_creator) =
        Display::with_options("agent-orb", width, height, !args.no_vsync)
            .context("failed to open window")?;
    let target = RenderTarget::with_size(&texture_creator, render_width, render_height)?;

    let mut backdrop = PixelBuffer::with_size(render_width, render_height);
    backdrop.fill_vertical_gradient(BACKDROP_TOP, BACKDROP_BOTTOM);

    let policy = if args.fixed_step {
        StepPolicy::PerTick
    } else {
        StepPolicy::Elapsed
    };

    log::info!(
        "preset {} at {}x{} ({}x{} px), step policy {:?}",
        config.preset,
        width,
        height,
        render_width,
        render_height,
        policy
    );
    if args.no_vsync {
        log::info!("VSync off (uncapped framerate)");
    }

    let mut orb = Orb::new(config, backend).with_step_policy(policy);
    let mut viewer = Viewer {
        display,
        target,
        orb_layer: PixelBuffer::with_size(render_width, render_height),
        frame: PixelBuffer::with_size(render_width, render_height),
        backdrop,
        clock: FrameClock::new(60),
        remote,
        config_path: args.config_path(),
    };

    let frames = run(&mut orb, &mut viewer)?;
    log::info!("exiting after {} frames", frames);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run_viewer(&args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
