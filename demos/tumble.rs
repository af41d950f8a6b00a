//! The default scene in a desktop window.
//!
//! Drag to orbit, double-click to throw the boxes again.
//!
//! Run with: cargo run --example tumble
//! Optional arguments: box count, gravity. `cargo run --example tumble -- 300 4`

use tumblebox::prelude::*;

fn main() -> Result<(), SimulationError> {
    let mut args = std::env::args().skip(1);
    let box_count = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);
    let gravity = args.next().and_then(|s| s.parse().ok()).unwrap_or(10.0);

    TumbleBox::new()
        .with_box_count(box_count)
        .with_gravity(gravity)
        .with_title("TumbleBox")
        .run()
}
