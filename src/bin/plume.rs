use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use plume::{
    BatchRenderer, EaseNoise, Emitter, Particle, ParticleSpec, Property, Surface, Transition,
};

#[derive(Parser, Debug)]
#[command(name = "plume", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a built-in effect to numbered PNG frames.
    Render(RenderArgs),
    /// Render a single particle spec (JSON) to numbered PNG frames.
    Spec(SpecArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Effect to render.
    #[arg(long, value_enum, default_value_t = EffectChoice::Galaxy)]
    effect: EffectChoice,

    /// Number of frames (one tick each, 60 ticks per second).
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Output directory for frame_NNNN.png files.
    #[arg(long)]
    out: PathBuf,

    /// Square canvas side in pixels.
    #[arg(long, default_value_t = 1000)]
    size: u32,

    /// Seed for the effect's deterministic sample stream.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct SpecArgs {
    /// Input particle spec JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Maximum number of frames; stops early once the particle expires.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Output directory for frame_NNNN.png files.
    #[arg(long)]
    out: PathBuf,

    /// Square canvas side in pixels.
    #[arg(long, default_value_t = 1000)]
    size: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EffectChoice {
    Fountain,
    Galaxy,
    Orbit,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Spec(args) => cmd_spec(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let side = f64::from(args.size);
    let mut noise = EaseNoise::seeded(args.seed);
    let mut spoke = 0.0f64;

    let (qty, generator): (f64, Box<dyn FnMut() -> ParticleSpec>) = match args.effect {
        EffectChoice::Fountain => (
            3.0,
            Box::new(move || fountain_spec(&mut noise, side)),
        ),
        EffectChoice::Galaxy => (
            4.0,
            Box::new(move || {
                spoke += 0.004;
                galaxy_spec(&mut noise, side, spoke)
            }),
        ),
        EffectChoice::Orbit => (0.02, Box::new(move || orbit_spec(side))),
    };

    let mut emitter = Emitter::new(args.size, args.size, qty, generator)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    for frame in 0..args.frames {
        emitter.update()?;
        write_frame(emitter.surface(), &args.out, frame)?;
    }

    eprintln!("wrote {} frames to {}", args.frames, args.out.display());
    Ok(())
}

fn cmd_spec(args: SpecArgs) -> anyhow::Result<()> {
    let spec = read_spec_json(&args.in_path)?;
    let mut particle = Particle::new(spec)?;
    let mut renderer = BatchRenderer::new();
    let mut surface = Surface::new(args.size, args.size)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let mut written = 0u64;
    for frame in 0..args.frames {
        particle.update();
        renderer.prepare([&particle])?;
        surface.clear();
        particle.draw(&mut surface, &renderer);
        write_frame(&surface, &args.out, frame)?;
        written += 1;
        if particle.expired() {
            break;
        }
    }

    eprintln!("wrote {} frames to {}", written, args.out.display());
    Ok(())
}

fn read_spec_json(path: &Path) -> anyhow::Result<ParticleSpec> {
    let f = File::open(path).with_context(|| format!("open spec '{}'", path.display()))?;
    let r = BufReader::new(f);
    let spec: ParticleSpec = serde_json::from_reader(r).with_context(|| "parse spec JSON")?;
    Ok(spec)
}

fn write_frame(surface: &Surface, out: &Path, frame: u64) -> anyhow::Result<()> {
    let path = out.join(format!("frame_{frame:04}.png"));
    image::save_buffer_with_format(
        &path,
        surface.data(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

/// Sparks rising from a base line, drifting sideways and burning out.
fn fountain_spec(noise: &mut EaseNoise, side: f64) -> ParticleSpec {
    let x = side * 0.4 + noise.next_f64() * side * 0.2;
    let g = noise.next_f64() * 160.0;
    let drift = noise.next_f64() * side * 0.16 - side * 0.08;
    let top = side * 0.3 + noise.next_f64() * side * 0.2;

    ParticleSpec::from_endpoints(
        Transition::new()
            .at(x, side * 0.7)
            .color(255.0, g, 0.0)
            .set(Property::Radius, 3.0),
        Some(
            Transition::new()
                .at(x + drift, top)
                .set(Property::Alpha, 0.0),
        ),
        1.0,
    )
}

/// Spokes spiralling out from the core, flaring up then fading at the rim.
fn galaxy_spec(noise: &mut EaseNoise, side: f64, spoke: f64) -> ParticleSpec {
    let rad = noise.next_f64() * std::f64::consts::TAU;
    let (r, g, b) = if noise.next_f64() < 0.05 {
        (
            noise.next_f64() * 256.0,
            noise.next_f64() * 256.0,
            noise.next_f64() * 256.0,
        )
    } else {
        (255.0, 255.0, 255.0)
    };
    let reach_x = side * 0.3 + noise.next_f64() * side * 0.016;
    let reach_y = side * 0.15 + noise.next_f64() * side * 0.008;

    ParticleSpec::from_transitions(vec![
        Transition::new()
            .at(side / 2.0, side / 2.0)
            .color(r, g, b)
            .set(Property::Radius, 3.0)
            .set(Property::Alpha, 0.1)
            .duration(4.0)
            .into(),
        Transition::new()
            .set(Property::Radius, noise.next_f64() * 5.0 + 5.0)
            .set(Property::Alpha, 1.0)
            .duration(1.0)
            .into(),
        Transition::new()
            .at(
                side / 2.0 + (rad + spoke).cos() * reach_x,
                side / 2.0 + (rad + spoke).sin() * reach_y,
            )
            .set(Property::Radius, 1.0)
            .set(Property::Alpha, 0.0)
            .into(),
    ])
}

/// One particle tracing a closed Bezier circuit around the canvas, cycling
/// colors and facing its direction of travel.
fn orbit_spec(side: f64) -> ParticleSpec {
    let s = side;
    ParticleSpec::from_transitions(vec![
        Transition::new().at(0.0, s).set(Property::R, 255.0).into(),
        Transition::new()
            .at(s, s)
            .control(s / 2.0, 0.0)
            .set(Property::R, 0.0)
            .set(Property::G, 255.0)
            .into(),
        Transition::new()
            .at(s, 0.0)
            .control(0.0, s / 2.0)
            .set(Property::G, 0.0)
            .set(Property::B, 255.0)
            .into(),
        Transition::new()
            .at(0.0, 0.0)
            .control(s / 2.0, s)
            .color(255.0, 255.0, 0.0)
            .into(),
        Transition::new()
            .at(0.0, s)
            .control(s, s / 2.0)
            .set(Property::G, 0.0)
            .into(),
    ])
    .with_face_direction()
}
