//! Runs the frame loop without a window and reports how the boxes settle.
//!
//! Run with: cargo run --example headless

use std::convert::Infallible;

use tumblebox::prelude::*;

const FRAMES: usize = 600;

/// Collects per-frame statistics and stops the loop after `FRAMES`.
struct Stats {
    frame: usize,
}

impl Presenter for Stats {
    type Error = ();

    fn present(&mut self, scene: &Scene) -> Result<(), ()> {
        self.frame += 1;
        if self.frame % 60 == 0 {
            let matrices = scene.cubes.matrices();
            let lowest = matrices
                .iter()
                .map(|m| m.w_axis.truncate())
                .fold(f32::INFINITY, |acc, p| acc.min(p.y));
            let spread = matrices
                .iter()
                .map(|m| m.w_axis.truncate().length())
                .fold(0.0_f32, f32::max);
            let camera = scene.camera.position;
            println!(
                "t={:>4.1}s  lowest y={:+.3}  max |p|={:.3}  camera=({:+.2}, {:+.2}, {:+.2})",
                self.frame as f32 / 60.0,
                lowest,
                spread,
                camera.x,
                camera.y,
                camera.z
            );
        }
        if self.frame >= FRAMES {
            Err(())
        } else {
            Ok(())
        }
    }
}

fn main() -> Result<(), SimulationError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let container = ContainerSize::new(800, 600);
    let mut state = AppState::with_seed(SimulationParams::default(), container, 1.0, 1)?;
    let mut stats = Stats { frame: 0 };

    let stopped: Result<Infallible, ()> = frame::run_forever(&mut state, &mut stats);
    if stopped.is_err() {
        println!("Stopped after {} frames", stats.frame);
    }
    Ok(())
}
