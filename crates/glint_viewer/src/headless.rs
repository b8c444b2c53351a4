//! Windowless display: renders a fixed number of frames and optionally saves them.

use anyhow::{Context, Result};
use glint_renderer::{Display, FrameBuffer, InputState};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

pub struct HeadlessDisplay {
    frames_left: u64,
    output_dir: Option<PathBuf>,
    presented: u64,
}

impl HeadlessDisplay {
    /// Render `frames` frames. With `output_dir`, each frame is written there as a PNG.
    pub fn new(frames: u64, output_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        Ok(Self {
            frames_left: frames,
            output_dir: output_dir.map(Path::to_path_buf),
            presented: 0,
        })
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    fn frame_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("frame_{:04}.png", self.presented))
    }
}

impl Display for HeadlessDisplay {
    fn poll_input(&mut self) -> InputState {
        if self.frames_left == 0 {
            return InputState {
                quit: true,
                ..InputState::default()
            };
        }
        self.frames_left -= 1;
        InputState::default()
    }

    fn present(&mut self, buffer: &FrameBuffer) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            let path = self.frame_path(dir);
            let image = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.to_rgba())
                .context("Frame buffer size does not match its dimensions")?;
            image
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }

        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_renderer::Color;

    #[test]
    fn test_quits_after_frame_budget() {
        let mut display = HeadlessDisplay::new(2, None).unwrap();

        assert!(!display.poll_input().quit);
        assert!(!display.poll_input().quit);
        assert!(display.poll_input().quit);
    }

    #[test]
    fn test_writes_png_frames() {
        let dir = std::env::temp_dir().join(format!("glint_headless_{}", std::process::id()));
        let mut display = HeadlessDisplay::new(1, Some(&dir)).unwrap();

        let buffer = FrameBuffer::new(5, 3);
        buffer.set(4, 2, Color::new(1.0, 0.0, 0.0)).unwrap();
        display.present(&buffer).unwrap();
        assert_eq!(display.presented(), 1);

        let written = image::open(dir.join("frame_0000.png")).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (5, 3));
        assert_eq!(written.get_pixel(4, 2).0, [255, 0, 0, 255]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
