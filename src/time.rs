//! Frame timing.
//!
//! Counts frames and keeps a periodically refreshed FPS figure for the window
//! title. The browser has no `std::time::Instant`, so [`Instant`] comes
//! from `web_time` there.
//!
//! # Example
//!
//! ```ignore
//! use tumblebox::time::Time;
//!
//! let mut time = Time::new();
//!
//! // Once per frame:
//! time.update();
//! if time.fps_refreshed() {
//!     println!("FPS: {:.1}", time.fps());
//! }
//! ```

use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;

/// How often the FPS figure is recomputed.
pub const FPS_UPDATE_INTERVAL: Duration = Duration::from_millis(500);

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct Time {
    frame_count: u64,
    fps: f32,
    /// Frame count at the last FPS refresh.
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_refreshed: bool,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a time tracker whose clock started at `now`.
    pub fn starting_at(now: Instant) -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_refreshed: false,
        }
    }

    /// Count a frame. Call once per frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// [`update`](Self::update) with an explicit clock reading.
    pub fn update_at(&mut self, now: Instant) {
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        self.fps_refreshed = fps_elapsed >= FPS_UPDATE_INTERVAL;
        if self.fps_refreshed {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Frames per second over the last refresh interval.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the last update recomputed [`fps`](Self::fps).
    #[inline]
    pub fn fps_refreshed(&self) -> bool {
        self.fps_refreshed
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
