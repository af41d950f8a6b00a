//! # TumbleBox
//!
//! Small cubes tumbling inside a wireframe box. Gravity always points "down"
//! as seen from the slowly orbiting camera, so the pile slides around the
//! container as the view turns. A double-click throws every cube again.
//!
//! Runs in a desktop window or, compiled to WebAssembly, in a
//! `<canvas id="canvas">` inside a `.container` element.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tumblebox::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     TumbleBox::new()
//!         .with_box_count(100)
//!         .with_box_size(0.03)
//!         .with_gravity(10.0)
//!         .run()
//! }
//! ```
//!
//! ## Without a window
//!
//! The frame loop only needs something implementing [`frame::Presenter`].
//! A closure works:
//!
//! ```ignore
//! use tumblebox::prelude::*;
//!
//! let mut state = AppState::new(SimulationParams::default(), ContainerSize::new(800, 600), 1.0)?;
//! let mut frames = 0;
//! let _ = frame::run_forever(&mut state, &mut |_: &Scene| {
//!     frames += 1;
//!     if frames < 600 { Ok(()) } else { Err(()) }
//! });
//! ```
//!
//! ## Per-frame order
//!
//! 1. Orbit controls update the camera.
//! 2. Physics advances one fixed step.
//! 3. Every body pose is copied into its instance transform.
//! 4. Instance transforms are flagged for upload.
//! 5. Gravity is re-aimed along the camera's down axis.
//! 6. The scene is presented.

pub mod controls;
pub mod error;
pub mod frame;
pub mod geometry;
mod gpu;
pub mod impulse;
pub mod input;
pub mod params;
pub mod physics;
pub mod scene;
mod simulation;
pub mod state;
pub mod time;
#[cfg(target_arch = "wasm32")]
mod web;

pub use error::{GpuError, ParamsError, SimulationError};
pub use frame::Presenter;
pub use gpu::GpuState;
pub use params::SimulationParams;
pub use scene::{ContainerSize, Scene};
pub use simulation::TumbleBox;
pub use state::AppState;

pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Everything needed for typical use.
pub mod prelude {
    pub use crate::error::SimulationError;
    pub use crate::frame::{self, Presenter};
    pub use crate::params::SimulationParams;
    pub use crate::scene::{ContainerSize, Scene};
    pub use crate::simulation::TumbleBox;
    pub use crate::state::AppState;
    pub use glam::{Mat4, Quat, Vec3};
}

/// Browser entry point: runs the default simulation in the host page.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    TumbleBox::new()
        .run()
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
}
