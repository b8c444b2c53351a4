//! Persistent worker pool that renders a frame's chunks.
//!
//! Each frame is published as a [`FrameJob`]. Workers (and the thread that
//! calls [`ChunkScheduler::run`]) claim chunks from the job through one
//! atomic cursor, so every chunk has exactly one owner. Between frames the
//! workers sleep on a condition variable; they only exit at shutdown.

use crate::chunk::{render_chunk, Chunk};
use crate::error::RenderError;
use crate::renderer::{FrameBuffer, RenderConfig};
use crate::scene::Scene;
use crate::Camera;
use crossbeam::utils::Backoff;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Progress of a frame job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Unclaimed chunks remain
    Active,
    /// Every chunk is claimed, some are still being rendered
    Draining,
    /// Nothing left to claim and every pixel has been written
    Done,
}

/// Everything the render threads need for one frame.
pub struct FrameJob {
    scene: Arc<Scene>,
    camera: Camera,
    config: RenderConfig,
    chunks: Arc<[Chunk]>,
    buffer: Arc<FrameBuffer>,
    cursor: AtomicUsize,
    completed: AtomicUsize,
    hits: AtomicU64,
    total_pixels: usize,
}

impl FrameJob {
    pub fn new(
        scene: Arc<Scene>,
        camera: Camera,
        config: RenderConfig,
        chunks: Arc<[Chunk]>,
        buffer: Arc<FrameBuffer>,
    ) -> Self {
        let total_pixels = chunks.iter().map(|c| c.pixel_count() as usize).sum();
        Self {
            scene,
            camera,
            config,
            chunks,
            buffer,
            cursor: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            total_pixels,
        }
    }

    pub fn state(&self) -> FrameState {
        if self.cursor.load(Ordering::Relaxed) < self.chunks.len() {
            FrameState::Active
        } else if self.completed.load(Ordering::Acquire) < self.total_pixels {
            FrameState::Draining
        } else {
            FrameState::Done
        }
    }

    pub fn total_pixels(&self) -> usize {
        self.total_pixels
    }

    pub fn completed_pixels(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn buffer(&self) -> &Arc<FrameBuffer> {
        &self.buffer
    }

    /// Give back the scene once the frame is finished.
    pub fn into_scene(self) -> Arc<Scene> {
        self.scene
    }

    /// Claim and render chunks until none are left.
    pub fn work(&self) {
        loop {
            let index = self.cursor.fetch_add(1, Ordering::Relaxed);
            let Some(chunk) = self.chunks.get(index) else {
                break;
            };

            let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
                render_chunk(chunk, &self.scene, &self.camera, &self.config, &self.buffer)
            }));

            let (pixels, hits) = match rendered {
                Ok(result) => (result.pixels, result.hits),
                Err(_) => {
                    log::error!("Chunk {:?} panicked; its pixels are left stale", chunk);
                    (chunk.pixel_count(), 0)
                }
            };

            self.hits.fetch_add(hits, Ordering::Relaxed);
            // Release publishes this chunk's pixel stores to the drain
            self.completed.fetch_add(pixels as usize, Ordering::AcqRel);
        }
    }

    /// Spin with backoff until every pixel has been written.
    pub fn wait_drained(&self) {
        let backoff = Backoff::new();
        while self.completed.load(Ordering::Acquire) < self.total_pixels {
            backoff.snooze();
        }
    }

    /// Render chunks until none are left, then wait out the other threads.
    pub fn work_and_drain(&self) {
        self.work();
        self.wait_drained();
    }
}

struct Slot {
    generation: u64,
    job: Option<Arc<FrameJob>>,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
    shutdown: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed pool of long-lived render workers.
pub struct ChunkScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    generation: u64,
}

impl ChunkScheduler {
    /// One worker per hardware thread except the caller's, at least 3.
    pub fn default_worker_count() -> usize {
        num_cpus::get().saturating_sub(1).max(3)
    }

    /// Spawn `worker_count` workers. Zero is allowed; the caller then renders alone.
    pub fn new(worker_count: usize) -> Result<Self, RenderError> {
        let mut scheduler = Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    generation: 0,
                    job: None,
                }),
                wake: Condvar::new(),
                shutdown: AtomicBool::new(false),
            }),
            workers: Vec::with_capacity(worker_count),
            generation: 0,
        };

        for index in 0..worker_count {
            let shared = Arc::clone(&scheduler.shared);
            let handle = thread::Builder::new()
                .name(format!("glint-worker-{}", index))
                .spawn(move || worker_loop(&shared))?;
            scheduler.workers.push(handle);
        }

        log::debug!("Started {} render workers", worker_count);
        Ok(scheduler)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Render `job` with every worker and the calling thread.
    ///
    /// Returns once all pixels are written and no worker holds the job any
    /// more, so the scene inside can be mutated again.
    pub fn run(&mut self, job: FrameJob) -> FrameJob {
        let mut job = Arc::new(job);
        self.generation += 1;
        {
            let mut slot = self.shared.lock();
            slot.generation = self.generation;
            slot.job = Some(Arc::clone(&job));
        }
        self.shared.wake.notify_all();

        job.work_and_drain();

        self.shared.lock().job = None;

        // Workers that picked the job up are at most finishing their claim loop
        let backoff = Backoff::new();
        loop {
            match Arc::try_unwrap(job) {
                Ok(finished) => return finished,
                Err(shared) => {
                    job = shared;
                    backoff.snooze();
                }
            }
        }
    }

    /// Stop and join every worker. Called automatically on drop.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        {
            let _slot = self.shared.lock();
            self.shared.shutdown.store(true, Ordering::Release);
        }
        self.shared.wake.notify_all();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Render worker panicked");
            }
        }
        log::debug!("Render workers stopped");
    }
}

impl Drop for ChunkScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    let mut seen = 0u64;

    loop {
        let job = {
            let mut slot = shared.lock();
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    return;
                }
                if slot.generation != seen {
                    if let Some(job) = &slot.job {
                        seen = slot.generation;
                        break Arc::clone(job);
                    }
                }
                slot = shared.wake.wait(slot).unwrap_or_else(PoisonError::into_inner);
            }
        };

        job.work_and_drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::generate_chunks;
    use crate::material::{Color, Material};
    use crate::primitive::Primitive;
    use crate::renderer::{render, trace};
    use crate::triangle::Triangle;
    use glint_math::Vec3;

    const WIDTH: u32 = 48;
    const HEIGHT: u32 = 32;

    fn test_scene() -> Scene {
        let mut scene = Scene::new(Vec3::new(0.0, 6.0, 2.0), 0.75);
        scene.add(Primitive::plane(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, Material::default()));
        scene.add(Primitive::sphere(
            Vec3::new(-0.8, 0.0, -4.0),
            1.0,
            Material::new(Color::new(0.9, 0.2, 0.2), Color::ONE, 32),
        ));
        scene.add(Primitive::triangle(
            Triangle::from_positions(
                Vec3::new(0.5, -1.0, -5.0),
                Vec3::new(2.5, -1.0, -5.0),
                Vec3::new(1.5, 1.5, -5.0),
            ),
            Material::matte(Color::new(0.2, 0.3, 0.9)),
        ));
        scene
    }

    fn test_camera() -> Camera {
        let mut camera = Camera::new()
            .with_resolution(WIDTH, HEIGHT)
            .with_position(Vec3::new(0.0, 0.5, 2.0), Vec3::new(0.0, 0.0, -4.0), Vec3::Y);
        camera.initialize();
        camera
    }

    fn job(scene: Arc<Scene>, config: RenderConfig, chunk_length: u32) -> FrameJob {
        FrameJob::new(
            scene,
            test_camera(),
            config,
            generate_chunks(WIDTH, HEIGHT, chunk_length).into(),
            Arc::new(FrameBuffer::new(WIDTH, HEIGHT)),
        )
    }

    #[test]
    fn test_default_worker_count_has_a_floor() {
        assert!(ChunkScheduler::default_worker_count() >= 3);
    }

    #[test]
    fn test_parallel_render_matches_reference() {
        let config = RenderConfig {
            soft_shadows: true,
            reflection_bounces: 1,
            ..RenderConfig::default()
        };
        let scene = Arc::new(test_scene());
        let reference = render(&scene, &test_camera(), &config).to_rgba();

        for workers in [1, 2, 4] {
            let mut scheduler = ChunkScheduler::new(workers).unwrap();
            let finished = scheduler.run(job(Arc::clone(&scene), config, 7));

            assert_eq!(finished.state(), FrameState::Done);
            assert_eq!(finished.completed_pixels(), (WIDTH * HEIGHT) as usize);
            assert_eq!(finished.buffer().to_rgba(), reference, "{} workers", workers);
        }
    }

    #[test]
    fn test_hit_counter_matches_traced_hits() {
        let config = RenderConfig {
            reflection_bounces: 1,
            ..RenderConfig::default()
        };
        let scene = Arc::new(test_scene());
        let camera = test_camera();

        let mut expected = 0u64;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                expected += u64::from(trace(&scene, &camera.get_ray(x, y), &config).hits);
            }
        }

        let mut scheduler = ChunkScheduler::new(3).unwrap();
        let finished = scheduler.run(job(scene, config, 16));
        assert_eq!(finished.hits(), expected);
    }

    #[test]
    fn test_scene_is_exclusive_after_run() {
        let mut scheduler = ChunkScheduler::new(2).unwrap();
        let mut scene = Arc::new(test_scene());

        for frame in 0..5 {
            let finished = scheduler.run(job(scene, RenderConfig::default(), 64));
            scene = finished.into_scene();

            let scene_mut = Arc::get_mut(&mut scene).expect("workers released the scene");
            scene_mut.move_lights(Vec3::new(0.1 * frame as f32, 0.0, 0.0));
        }
    }

    #[test]
    fn test_zero_workers_renders_on_caller() {
        let mut scheduler = ChunkScheduler::new(0).unwrap();
        assert_eq!(scheduler.worker_count(), 0);

        let finished = scheduler.run(job(Arc::new(test_scene()), RenderConfig::default(), 5));
        assert_eq!(finished.state(), FrameState::Done);
    }

    #[test]
    fn test_out_of_bounds_chunk_still_drains() {
        let chunks: Arc<[Chunk]> = vec![Chunk::new(0, 4, 0), Chunk::new(0, 4, HEIGHT + 3)].into();
        let fresh = FrameJob::new(
            Arc::new(test_scene()),
            test_camera(),
            RenderConfig::default(),
            chunks,
            Arc::new(FrameBuffer::new(WIDTH, HEIGHT)),
        );
        assert_eq!(fresh.state(), FrameState::Active);

        let mut scheduler = ChunkScheduler::new(1).unwrap();
        let finished = scheduler.run(fresh);
        assert_eq!(finished.completed_pixels(), 8);
        assert_eq!(finished.state(), FrameState::Done);
    }

    #[test]
    fn test_every_thread_returns_after_the_frame_is_done() {
        let job = job(Arc::new(test_scene()), RenderConfig::default(), 3);

        thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        job.work_and_drain();
                        job.state()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), FrameState::Done);
            }
        });
        assert_eq!(job.completed_pixels(), (WIDTH * HEIGHT) as usize);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut scheduler = ChunkScheduler::new(3).unwrap();
        scheduler.shutdown();
        assert_eq!(scheduler.worker_count(), 0);
        scheduler.shutdown();
    }
}
