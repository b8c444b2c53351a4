mod app;
mod headless;
mod presenter;
mod scene_setup;

use anyhow::{Context, Result};
use clap::Parser;
use glint_renderer::{ChunkScheduler, FrameDriver, RenderConfig, DEFAULT_CHUNK_LENGTH};
use headless::HeadlessDisplay;
use std::path::PathBuf;

/// Interactive multi-threaded CPU ray tracer
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Frame width in pixels
    #[clap(long, default_value_t = 800)]
    width: u32,

    /// Frame height in pixels
    #[clap(long, default_value_t = 600)]
    height: u32,

    /// Render workers besides the main thread [default: hardware threads - 1, at least 3]
    #[clap(long)]
    threads: Option<usize>,

    /// OBJ file used as the toggleable mesh (a pyramid otherwise)
    #[clap(long, value_name = "OBJ")]
    mesh: Option<PathBuf>,

    /// Render this many frames without a window, then exit
    #[clap(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Directory headless frames are written to as PNG
    #[clap(long, value_name = "DIR", requires = "headless")]
    output: Option<PathBuf>,

    /// Pixels per work chunk
    #[clap(long, default_value_t = DEFAULT_CHUNK_LENGTH)]
    chunk_length: u32,

    /// Start with soft shadows enabled
    #[clap(long)]
    soft_shadows: bool,

    /// Start with one reflection bounce
    #[clap(long)]
    reflections: bool,

    /// Start with the mesh in the scene
    #[clap(long)]
    show_mesh: bool,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            soft_shadows: self.soft_shadows,
            reflection_bounces: u32::from(self.reflections),
            chunk_length: self.chunk_length,
            ..RenderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.width > 0 && args.height > 0, "Frame size must be non-zero");

    log::info!("Starting Glint");

    let mesh = match &args.mesh {
        Some(path) => {
            let triangles = glint_core::load_triangles(path)
                .with_context(|| format!("Failed to load mesh {}", path.display()))?;
            Some(triangles)
        }
        None => None,
    };

    let mut scene = scene_setup::demo_scene(mesh);
    if args.show_mesh {
        scene.add_extra();
    }
    let camera = scene_setup::demo_camera(args.width, args.height);
    let workers = args.threads.unwrap_or_else(ChunkScheduler::default_worker_count);

    let mut driver = FrameDriver::new(scene, camera, args.render_config(), workers)?;

    if let Some(frames) = args.headless {
        let mut display = HeadlessDisplay::new(frames, args.output.as_deref())?;
        let presented = driver.render_loop(&mut display)?;
        log::info!("Rendered {} frames", presented);
        return Ok(());
    }

    app::run(driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["glint_viewer"]).unwrap();

        assert_eq!((args.width, args.height), (800, 600));
        assert!(args.headless.is_none());
        assert_eq!(args.render_config(), RenderConfig::default());
    }

    #[test]
    fn test_flags_map_to_render_config() {
        let args = Args::try_parse_from([
            "glint_viewer",
            "--soft-shadows",
            "--reflections",
            "--chunk-length",
            "16",
            "--headless",
            "3",
            "--output",
            "out",
        ])
        .unwrap();

        let config = args.render_config();
        assert!(config.soft_shadows);
        assert_eq!(config.reflection_bounces, 1);
        assert_eq!(config.chunk_length, 16);
        assert_eq!(args.headless, Some(3));
        assert_eq!(args.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_output_requires_headless() {
        assert!(Args::try_parse_from(["glint_viewer", "--output", "out"]).is_err());
    }

    #[test]
    fn test_headless_run_renders_requested_frames() {
        let scene = scene_setup::demo_scene(None);
        let camera = scene_setup::demo_camera(32, 24);
        let mut driver = FrameDriver::new(scene, camera, RenderConfig::default(), 2).unwrap();

        let mut display = HeadlessDisplay::new(2, None).unwrap();
        assert_eq!(driver.render_loop(&mut display).unwrap(), 2);
        assert_eq!(display.presented(), 2);
    }
}
