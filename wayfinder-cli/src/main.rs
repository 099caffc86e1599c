// Wayfinder command line interface
// Scans location markers, plans routes across the floor and speaks them

mod config;
mod console;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use console::ConsoleInput;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wayfinder_core::{CoordinateMap, Navigator, RoutePath, RoutePlanner, SpeechSink, Topology};
use wayfinder_eye::overlay::{draw_route, render_route_file};
use wayfinder_eye::{FrameRecorder, FrameSource, GuidanceLoop, ImageSequenceSource, MarkerDecoder, ScanOutcome};
use wayfinder_spk::{EngineKind, VoiceServices};

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Indoor navigation with colored location markers and spoken routes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Topology file replacing the built-in floor
    #[arg(long, global = true)]
    topology: Option<PathBuf>,

    /// Log speech instead of using the system synthesizer
    #[arg(long, global = true)]
    mute: bool,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List waypoints, their map positions and the destination list
    Nodes,

    /// Compute and narrate the route between two waypoints
    Route {
        from: String,
        to: String,

        /// Floor-map image to draw the route on
        #[arg(long)]
        map: Option<PathBuf>,

        /// Write the route overlay PNG here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Scan for a location marker
    Locate(ScanArgs),

    /// Find the current location, pick a destination and announce the route
    Navigate {
        #[command(flatten)]
        scan: ScanArgs,

        /// Skip scanning and start from this waypoint
        #[arg(long)]
        from: Option<String>,

        /// Destination waypoint (random when neither this nor --voice is given)
        #[arg(long, conflicts_with = "voice")]
        to: Option<String>,

        /// Ask for the destination by voice
        #[arg(long)]
        voice: bool,

        /// Write the route overlay PNG here
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Clone, Default)]
struct ScanArgs {
    /// Replay frames from a directory instead of the camera
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Camera device index
    #[arg(long)]
    camera: Option<u32>,

    /// Write annotated frames to this directory
    #[arg(long)]
    record: Option<PathBuf>,

    /// Report any marker close enough to read as this location
    #[arg(long)]
    assume: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config warnings fire before the real subscriber exists
    let mut config = tracing::subscriber::with_default(startup_subscriber(), || {
        AppConfig::load(cli.config.as_deref())
    })
    .context("Failed to load configuration")?;
    if let Some(topology) = &cli.topology {
        config.navigation.topology_path = Some(topology.clone());
    }
    if cli.mute {
        config.speech.engine = EngineKind::Log;
    }

    init_tracing(&config.log_level, cli.verbose);

    let topology = load_topology(&config)?;

    match cli.command {
        Commands::Nodes => cmd_nodes(&topology),
        Commands::Route { from, to, map, out } => {
            let map = map.or_else(|| config.navigation.map_image.clone());
            cmd_route(&topology, &from, &to, map.as_deref(), out.as_deref())
        }
        Commands::Locate(scan) => {
            let console = ConsoleInput::spawn();
            let voice = start_voice(&config, &topology, &console)?;
            let outcome = locate(&config, &scan, voice.speaker().as_ref(), &console)?;
            report_outcome(&outcome);
            voice.shutdown();
            Ok(())
        }
        Commands::Navigate {
            scan,
            from,
            to,
            voice: by_voice,
            out,
        } => {
            let console = ConsoleInput::spawn();
            let voice = start_voice(&config, &topology, &console)?;
            let result = cmd_navigate(
                &config,
                &topology,
                &voice,
                &console,
                NavigateArgs {
                    scan,
                    from,
                    to,
                    by_voice,
                    out,
                },
            );
            voice.shutdown();
            result
        }
    }
}

fn init_tracing(default_level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn startup_subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish()
}

fn load_topology(config: &AppConfig) -> Result<Topology> {
    let topology = match &config.navigation.topology_path {
        Some(path) => Topology::from_file(path)
            .with_context(|| format!("Failed to load topology from {}", path.display()))?,
        None => Topology::builtin_floor(),
    };
    topology.validate()?;
    Ok(topology)
}

fn start_voice(config: &AppConfig, topology: &Topology, console: &ConsoleInput) -> Result<VoiceServices> {
    let grammar = topology.destinations.clone();
    Ok(VoiceServices::initialize(&config.speech, grammar, console.lines())?)
}

fn cmd_nodes(topology: &Topology) -> Result<()> {
    println!("{:<24} {:>12}  destination", "waypoint", "map position");
    for node in &topology.nodes {
        let position = node
            .position
            .map(|p| format!("({}, {})", p.x, p.y))
            .unwrap_or_else(|| "-".to_string());
        let is_destination = topology.destinations.iter().any(|d| d == &node.name);
        println!(
            "{:<24} {:>12}  {}",
            node.name,
            position,
            if is_destination { "yes" } else { "" }
        );
    }
    println!(
        "{} waypoints, {} corridors, {} destinations",
        topology.nodes.len(),
        topology.edges.len(),
        topology.destinations.len()
    );
    Ok(())
}

fn cmd_route(topology: &Topology, from: &str, to: &str, map: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let graph = topology.build_graph()?;
    let path = RoutePlanner::new(&graph).compute_route(from, to)?;

    if path.is_empty() {
        println!("No route from {} to {}", from, to);
        return Ok(());
    }

    println!("{}", path.nodes().join(" -> "));
    println!("cost: {}", path.cost());
    println!("{}", wayfinder_core::narrate(path.nodes()));

    if let Some(out) = out {
        write_route_map(&path, &topology.coordinates(), map, out)?;
    }
    Ok(())
}

struct NavigateArgs {
    scan: ScanArgs,
    from: Option<String>,
    to: Option<String>,
    by_voice: bool,
    out: Option<PathBuf>,
}

fn cmd_navigate(
    config: &AppConfig,
    topology: &Topology,
    voice: &VoiceServices,
    console: &ConsoleInput,
    args: NavigateArgs,
) -> Result<()> {
    let navigator = Navigator::new(topology, voice.speaker())?;

    let origin = match args.from {
        Some(origin) => origin,
        None => {
            let outcome = locate(config, &args.scan, voice.speaker().as_ref(), console)?;
            report_outcome(&outcome);
            match outcome {
                ScanOutcome::Located(location) => location,
                _ => return Ok(()),
            }
        }
    };
    if navigator.graph().id(&origin).is_none() {
        bail!("'{}' is not a known waypoint", origin);
    }

    let destination = match (args.to, args.by_voice) {
        (Some(to), _) => to,
        (None, true) => {
            println!("Say (type) your destination:");
            match navigator.destination_by_voice(voice.recognizer(), config.navigation.recognizer_timeout()) {
                Some(destination) => destination,
                None => {
                    println!("No destination understood");
                    return Ok(());
                }
            }
        }
        (None, false) => navigator
            .random_destination(&origin, &mut rand::thread_rng())
            .ok_or_else(|| anyhow!("No destination other than {} is configured", origin))?,
    };

    let plan = navigator.plan(&origin, &destination)?;
    info!("Route planned from {} to {}", plan.origin, plan.destination);

    match &plan.narration {
        Some(narration) => {
            println!("{}", plan.path.nodes().join(" -> "));
            println!("{}", narration);
        }
        None if plan.origin == plan.destination => println!("Already at {}", plan.destination),
        None => println!("No route from {} to {}", plan.origin, plan.destination),
    }

    if let (Some(out), true) = (args.out.as_deref(), plan.is_navigable()) {
        write_route_map(
            &plan.path,
            navigator.coordinates(),
            config.navigation.map_image.as_deref(),
            out,
        )?;
    }
    Ok(())
}

fn locate(config: &AppConfig, args: &ScanArgs, speech: &dyn SpeechSink, console: &ConsoleInput) -> Result<ScanOutcome> {
    let mut scan_config = config.scan.clone();
    if let Some(camera) = args.camera {
        scan_config.camera_id = camera;
    }

    let decoder = build_decoder(args.assume.as_deref())?;
    let mut source = open_source(&scan_config, args)?;
    let mut recorder = match &args.record {
        Some(dir) => Some(FrameRecorder::new(dir.clone(), scan_config.guide_box_size)?),
        None => None,
    };

    let mut scan = GuidanceLoop::new(&scan_config, decoder.as_ref(), speech)?;
    if let Some(recorder) = recorder.as_mut() {
        scan = scan.with_display(recorder);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let watch = console.watch_for_cancel(cancel.clone());
    println!("Scanning, press Enter to cancel");
    let outcome = scan.run(source.as_mut(), &cancel);
    drop(watch);

    Ok(outcome)
}

fn report_outcome(outcome: &ScanOutcome) {
    match outcome {
        ScanOutcome::Located(location) => println!("Location: {}", location),
        ScanOutcome::Cancelled => println!("Scan cancelled"),
        ScanOutcome::CameraLost => println!("Camera feed lost"),
    }
}

fn build_decoder(assume: Option<&str>) -> Result<Box<dyn MarkerDecoder>> {
    match assume {
        Some(location) => {
            warn!("Decoding disabled, any readable marker counts as {}", location);
            let location = location.to_string();
            Ok(Box::new(move |_: &RgbImage| Some(location.clone())))
        }
        None => default_decoder(),
    }
}

#[cfg(feature = "opencv")]
fn default_decoder() -> Result<Box<dyn MarkerDecoder>> {
    Ok(Box::new(wayfinder_eye::decoder::QrCodeDecoder::new()?))
}

#[cfg(not(feature = "opencv"))]
fn default_decoder() -> Result<Box<dyn MarkerDecoder>> {
    bail!("No QR decoder in this build: enable the `opencv` feature or pass --assume LOCATION")
}

fn open_source(config: &wayfinder_eye::ScanConfig, args: &ScanArgs) -> Result<Box<dyn FrameSource>> {
    match &args.frames {
        Some(dir) => Ok(Box::new(ImageSequenceSource::from_dir(dir)?)),
        None => open_camera(config),
    }
}

#[cfg(feature = "opencv")]
fn open_camera(config: &wayfinder_eye::ScanConfig) -> Result<Box<dyn FrameSource>> {
    let mut camera = wayfinder_eye::camera::CameraManager::new(config);
    camera.initialize()?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "opencv"))]
fn open_camera(_config: &wayfinder_eye::ScanConfig) -> Result<Box<dyn FrameSource>> {
    bail!("Live capture needs the `opencv` feature; use --frames DIR to replay recorded frames")
}

/// White canvas large enough to hold every mapped waypoint
fn blank_canvas(coordinates: &CoordinateMap) -> RgbImage {
    const MARGIN: u32 = 50;
    let width = coordinates.values().map(|p| p.x.max(0) as u32).max().unwrap_or(0) + MARGIN;
    let height = coordinates.values().map(|p| p.y.max(0) as u32).max().unwrap_or(0) + MARGIN;
    RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
}

fn write_route_map(path: &RoutePath, coordinates: &CoordinateMap, map: Option<&Path>, out: &Path) -> Result<()> {
    match map {
        Some(map) => render_route_file(map, out, path, coordinates)
            .with_context(|| format!("Failed to draw route on {}", map.display()))?,
        None => {
            let mut canvas = blank_canvas(coordinates);
            draw_route(&mut canvas, path, coordinates)?;
            canvas
                .save(out)
                .with_context(|| format!("Failed to write {}", out.display()))?;
        }
    }
    println!("Route map written to {}", out.display());
    Ok(())
}
