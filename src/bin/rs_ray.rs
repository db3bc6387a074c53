// std
use std::path::PathBuf;
use std::process;
// others
use clap::Parser;
use log::{error, info};
// rs_ray
use rs_ray::core::animation::{Interpolation, RotationParameters};
use rs_ray::core::common::Float;
use rs_ray::core::error::Result;
use rs_ray::core::preview::render_preview;
use rs_ray::core::registry;
use rs_ray::core::scene::Scene;
use rs_ray::core::shape::{set_tessellation_complexity, tessellation_complexity};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse a ray scene file (extension .ray), report what it contains
/// and optionally write a preview image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// The path to the scene file to read
    #[arg(long = "in")]
    input: PathBuf,
    /// tessellation complexity for curved shapes
    #[arg(long, default_value_t = 10)]
    cplx: usize,
    /// width of the preview image
    #[arg(long, default_value_t = 640)]
    width: u32,
    /// height of the preview image
    #[arg(long, default_value_t = 480)]
    height: u32,
    /// keyframe interpolation, 'nearest' or 'linear'
    #[arg(long, default_value_t = Interpolation::Nearest)]
    interpolant: Interpolation,
    /// rotation parametrisation for linear keyframe interpolation,
    /// 'trivial', 'closest' or 'quaternion'
    #[arg(long, default_value_t = RotationParameters::Trivial)]
    parameter: RotationParameters,
    /// animation time used to sample keyframed transforms
    #[arg(long, default_value_t = 0.0)]
    time: Float,
    /// use specified number of threads for rendering (0 = all cores)
    #[arg(short = 't', long, default_value_t = 0)]
    nthreads: usize,
    /// write a preview rendering to this image file
    #[arg(long)]
    out: Option<PathBuf>,
}

fn run(args: &Cli) -> Result<()> {
    registry::initialize()?;
    set_tessellation_complexity(args.cplx);
    let scene: Scene = Scene::load(&args.input)?;
    scene.animate(args.time, args.interpolant, args.parameter);
    info!(
        "{}: {} shape(s), {} light(s), {} channel(s)",
        args.input.display(),
        scene.shapes.len(),
        scene.lights.len(),
        scene.channels.len()
    );
    let bound = scene.world_bound();
    if bound.is_empty() {
        info!("World bound: empty");
    } else {
        info!("World bound: {:?} - {:?}", bound.p_min, bound.p_max);
    }
    let mesh = scene.tessellate();
    println!(
        "{} shape(s), {} light(s), {} triangle(s) at complexity {}",
        scene.shapes.len(),
        scene.lights.len(),
        mesh.triangle_count(),
        tessellation_complexity()
    );
    if let Some(ref out) = args.out {
        let image = render_preview(&scene, args.width, args.height, true);
        match image.save(out) {
            Ok(()) => info!("Wrote {}", out.display()),
            Err(e) => error!("Could not write {}: {}", out.display(), e),
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
    // handle command line options
    let args = Cli::parse();
    let num_cores: usize = num_cpus::get();
    let num_threads: usize = if args.nthreads == 0 {
        num_cores
    } else {
        args.nthreads
    };
    info!(
        "rs_ray version {} [Detected {} cores, using {}]",
        VERSION, num_cores, num_threads
    );
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        error!("{}", e);
    }
    let result: Result<()> = run(&args);
    registry::teardown();
    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}
