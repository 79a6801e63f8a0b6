//! Time-driven animation overlay. Frames are derived from a grid and an
//! absolute elapsed time; the source grid is never modified.

use crate::grid::CharacterGrid;
use crate::{Result, VsciiError};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::str::FromStr;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const RANDOM_GLYPHS: &[char] = &[
    '@', '#', '$', '%', '&', '*', '+', '=', '-', ':', '.', '?', '!', '|', '/', '\\',
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationStyle {
    #[default]
    Simple,
    Pulse,
    Wave,
    Random,
}

impl FromStr for AnimationStyle {
    type Err = VsciiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(AnimationStyle::Simple),
            "pulse" => Ok(AnimationStyle::Pulse),
            "wave" => Ok(AnimationStyle::Wave),
            "random" => Ok(AnimationStyle::Random),
            other => Err(VsciiError::InvalidSettings(format!("unknown animation style '{other}'"))),
        }
    }
}

/// Values derived from elapsed time for one style.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub style: AnimationStyle,
    pub elapsed_ms: f64,
    pub frame: u64,
    pub phase: f64,
    pub scale: f64,
}

impl AnimationState {
    /// Negative or non-finite times are treated as zero.
    pub fn at(style: AnimationStyle, elapsed_ms: f64) -> Self {
        let t = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
        let (frame, phase, scale) = match style {
            AnimationStyle::Simple => (((t / 150.0).floor() as u64) % 4, 0.0, 1.0),
            AnimationStyle::Pulse => {
                (((t / 200.0).floor() as u64) % 4, 0.0, 0.8 + 0.4 * (t / 500.0).sin())
            }
            AnimationStyle::Wave => (((t / 200.0).floor() as u64) % 4, (t / 100.0) % TAU, 1.0),
            AnimationStyle::Random => ((t / 80.0).floor() as u64, 0.0, 1.0),
        };
        Self { style, elapsed_ms: t, frame, phase, scale }
    }

    /// Replacement glyph for the cell at (col, row), if this cell animates.
    pub fn substitute(&self, col: usize, row: usize) -> Option<char> {
        match self.style {
            AnimationStyle::Simple => (col % 10 == 0).then(|| SPINNER[self.frame as usize % 4]),
            AnimationStyle::Pulse => ((col + row) % 7 == 0)
                .then_some(if self.scale > 1.0 { '#' } else { '.' }),
            AnimationStyle::Wave => ((col as f64 * 0.2 + self.phase).sin() > 0.7)
                .then(|| SPINNER[self.frame as usize % 4]),
            AnimationStyle::Random => self.is_random_candidate(col, row).then(|| {
                let h = mix64(self.frame ^ ((row as u64) << 32) ^ col as u64);
                RANDOM_GLYPHS[(h % RANDOM_GLYPHS.len() as u64) as usize]
            }),
        }
    }

    fn is_random_candidate(&self, col: usize, row: usize) -> bool {
        ((col as u64).wrapping_mul(row as u64)) % 23 == self.frame % 23
    }
}

// SplitMix64 finalizer.
fn mix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derived frame of `grid` at `elapsed_ms`. Same shape, colors kept.
pub fn render_frame(grid: &CharacterGrid, style: AnimationStyle, elapsed_ms: f64) -> CharacterGrid {
    let state = AnimationState::at(style, elapsed_ms);
    grid.map_cells(|col, row, cell| match state.substitute(col, row) {
        Some(glyph) => cell.with_glyph(glyph),
        None => cell,
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub use player::Player;

#[cfg(not(target_arch = "wasm32"))]
mod player {
    use super::{render_frame, AnimationStyle};
    use crate::grid::CharacterGrid;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread::JoinHandle;
    use std::time::{Duration, Instant};

    /// Background frame loop. Each tick renders from the absolute time since
    /// start; stopping (or dropping) joins the thread before returning.
    pub struct Player {
        running: Arc<AtomicBool>,
        handle: Option<JoinHandle<u64>>,
    }

    impl Player {
        pub fn spawn<F>(grid: CharacterGrid, style: AnimationStyle, fps: u32, mut sink: F) -> Self
        where
            F: FnMut(&CharacterGrid, f64) + Send + 'static,
        {
            let running = Arc::new(AtomicBool::new(true));
            let flag = Arc::clone(&running);
            let fps = fps.clamp(1, 240);

            let handle = std::thread::spawn(move || {
                let start = Instant::now();
                let mut frames = 0u64;
                while flag.load(Ordering::Acquire) {
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    sink(&render_frame(&grid, style, elapsed_ms), elapsed_ms);
                    frames += 1;
                    park_until(&flag, start + frame_offset(fps, frames));
                }
                frames
            });
            tracing::debug!(?style, fps, "animation started");
            Self { running, handle: Some(handle) }
        }

        pub fn is_running(&self) -> bool {
            self.running.load(Ordering::Acquire)
        }

        /// Stop issuing frames and wait for the loop to exit. Returns the
        /// number of frames delivered.
        pub fn stop(mut self) -> u64 {
            self.shutdown()
        }

        fn shutdown(&mut self) -> u64 {
            self.running.store(false, Ordering::Release);
            let Some(handle) = self.handle.take() else {
                return 0;
            };
            handle.thread().unpark();
            let frames = handle.join().unwrap_or(0);
            tracing::debug!(frames, "animation stopped");
            frames
        }
    }

    impl Drop for Player {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    /// Time from start at which frame number `frames` is due.
    pub(super) fn frame_offset(fps: u32, frames: u64) -> Duration {
        Duration::from_secs_f64(frames as f64 / fps.max(1) as f64)
    }

    // Sleeps until `deadline`, waking early when the flag is cleared.
    fn park_until(flag: &AtomicBool, deadline: Instant) {
        while flag.load(Ordering::Acquire) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::park_timeout(deadline - now);
        }
    }
}
