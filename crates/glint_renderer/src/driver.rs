//! Frame loop: applies input between frames, renders, hands frames to a display.

use crate::chunk::{generate_chunks, Chunk};
use crate::error::RenderError;
use crate::renderer::{FrameBuffer, RenderConfig};
use crate::scene::Scene;
use crate::scheduler::{ChunkScheduler, FrameJob};
use crate::Camera;
use glint_math::Vec3;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Light movement speed in world units per second.
pub const DEFAULT_LIGHT_SPEED: f32 = 2.0;

/// User input collected since the previous frame.
///
/// Every `toggle_*` and mesh flag is an edge: true only in the frame the key
/// went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub quit: bool,
    /// -1, 0 or 1: direction to move the light along X
    pub move_axis: i32,
    pub toggle_soft_shadows: bool,
    pub toggle_reflections: bool,
    pub toggle_logging: bool,
    pub add_mesh: bool,
    pub remove_mesh: bool,
}

/// Where finished frames go and where input comes from.
pub trait Display {
    fn poll_input(&mut self) -> InputState;

    fn present(&mut self, buffer: &FrameBuffer) -> anyhow::Result<()>;
}

/// Timing and counters of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub elapsed: Duration,
    pub hits: u64,
    pub pixels: usize,
}

/// Owns the scene, the worker pool and the frame buffer.
pub struct FrameDriver {
    scene: Arc<Scene>,
    camera: Camera,
    config: RenderConfig,
    scheduler: ChunkScheduler,
    chunks: Arc<[Chunk]>,
    buffer: Arc<FrameBuffer>,
    light_speed: f32,
    frame_index: u64,
}

impl FrameDriver {
    pub fn new(
        scene: Scene,
        mut camera: Camera,
        config: RenderConfig,
        worker_count: usize,
    ) -> Result<Self, RenderError> {
        camera.initialize();
        let chunks = generate_chunks(camera.image_width, camera.image_height, config.chunk_length);
        log::info!(
            "Rendering {}x{} in {} chunks with {} workers",
            camera.image_width,
            camera.image_height,
            chunks.len(),
            worker_count
        );

        Ok(Self {
            scene: Arc::new(scene),
            buffer: Arc::new(FrameBuffer::new(camera.image_width, camera.image_height)),
            chunks: chunks.into(),
            scheduler: ChunkScheduler::new(worker_count)?,
            camera,
            config,
            light_speed: DEFAULT_LIGHT_SPEED,
            frame_index: 0,
        })
    }

    pub fn with_light_speed(mut self, speed: f32) -> Self {
        self.light_speed = speed;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn worker_count(&self) -> usize {
        self.scheduler.worker_count()
    }

    /// Apply toggles, mesh changes and light movement. Only called between frames.
    pub fn apply_input(&mut self, input: &InputState, dt: f32) {
        if input.toggle_soft_shadows {
            self.config.soft_shadows = !self.config.soft_shadows;
            log::info!("Soft shadows {}", on_off(self.config.soft_shadows));
        }
        if input.toggle_reflections {
            self.config.reflection_bounces = if self.config.reflection_bounces == 0 { 1 } else { 0 };
            log::info!("Reflections {}", on_off(self.config.reflection_bounces > 0));
        }
        if input.toggle_logging {
            self.config.logging = !self.config.logging;
            log::info!("Frame logging {}", on_off(self.config.logging));
        }

        let wants_scene = input.add_mesh || input.remove_mesh || input.move_axis != 0;
        if !wants_scene {
            return;
        }

        let Some(scene) = Arc::get_mut(&mut self.scene) else {
            log::warn!("Scene is still shared with a frame; input ignored");
            return;
        };

        if input.add_mesh && scene.add_extra() {
            log::info!("Extra mesh added ({} primitives)", scene.len());
        }
        if input.remove_mesh && scene.remove_extra() {
            log::info!("Extra mesh removed ({} primitives)", scene.len());
        }
        if input.move_axis != 0 {
            let step = input.move_axis.signum() as f32 * self.light_speed * dt;
            scene.move_lights(Vec3::new(step, 0.0, 0.0));
        }
    }

    /// Apply `input`, then render one full frame into the buffer.
    pub fn run_frame(&mut self, input: &InputState, dt: f32) -> FrameStats {
        self.apply_input(input, dt);

        let start = Instant::now();
        let job = FrameJob::new(
            Arc::clone(&self.scene),
            self.camera.clone(),
            self.config,
            Arc::clone(&self.chunks),
            Arc::clone(&self.buffer),
        );
        let finished = self.scheduler.run(job);

        let stats = FrameStats {
            frame: self.frame_index,
            elapsed: start.elapsed(),
            hits: finished.hits(),
            pixels: finished.completed_pixels(),
        };
        drop(finished);
        self.frame_index += 1;

        if self.config.logging {
            log::info!(
                "Frame {}: {:.2} ms, {} hits, {} pixels",
                stats.frame,
                stats.elapsed.as_secs_f64() * 1000.0,
                stats.hits,
                stats.pixels
            );
        }

        stats
    }

    /// Render and present frames until the display asks to quit.
    ///
    /// Returns the number of frames presented.
    pub fn render_loop(&mut self, display: &mut dyn Display) -> anyhow::Result<u64> {
        let mut presented = 0;
        let mut last = Instant::now();

        loop {
            let input = display.poll_input();
            if input.quit {
                break;
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            self.run_frame(&input, dt);
            display.present(&self.buffer)?;
            presented += 1;
        }

        Ok(presented)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
