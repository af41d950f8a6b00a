//! Pointer input.
//!
//! The `Input` struct turns raw winit window events into per-frame pointer
//! state: buttons pressed, held or released this frame, cursor movement,
//! wheel scroll, and double-clicks.
//!
//! winit reports individual presses only, on the desktop and in the browser
//! alike, so double-clicks are recognized here: two left presses close enough
//! in time and space.
//!
//! # Usage
//!
//! ```ignore
//! input.handle_event(&event);
//!
//! // Once per frame:
//! if input.double_clicked() {
//!     state.on_double_click();
//! }
//! if input.mouse_held(MouseButton::Left) {
//!     state.on_drag(input.mouse_delta());
//! }
//! input.begin_frame();
//! ```

use std::collections::HashSet;
use std::time::Duration;

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};

use crate::time::Instant;

/// Longest gap between the two presses of a double-click.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);
/// Farthest the cursor may move between the two presses, in pixels.
pub const DOUBLE_CLICK_DISTANCE: f32 = 5.0;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    fn from_winit(button: WinitMouseButton) -> Option<Self> {
        match button {
            WinitMouseButton::Left => Some(MouseButton::Left),
            WinitMouseButton::Right => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Pointer state for the current frame.
#[derive(Debug, Default)]
pub struct Input {
    // Button state
    mouse_held: HashSet<MouseButton>,
    mouse_pressed: HashSet<MouseButton>,
    mouse_released: HashSet<MouseButton>,

    // Cursor
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,

    scroll_delta: f32,

    // Double-click tracking
    last_click: Option<(Instant, Vec2)>,
    double_clicked: bool,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Mouse Button Queries ==========

    /// Check if a mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_pressed.contains(&button)
    }

    /// Check if a mouse button is currently held down.
    pub fn mouse_held(&self, button: MouseButton) -> bool {
        self.mouse_held.contains(&button)
    }

    /// Check if a mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_released.contains(&button)
    }

    /// Whether a double-click completed this frame.
    pub fn double_clicked(&self) -> bool {
        self.double_clicked
    }

    // ========== Cursor Queries ==========

    /// Cursor movement this frame in pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Wheel movement this frame in lines. Positive is up/away.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }

    // ========== Event Intake ==========

    /// Clear per-frame state. Call after the frame has consumed it.
    pub fn begin_frame(&mut self) {
        self.mouse_pressed.clear();
        self.mouse_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
        self.double_clicked = false;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = MouseButton::from_winit(*button) {
                    match state {
                        ElementState::Pressed => self.press(button, Instant::now()),
                        ElementState::Released => self.release(button),
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_position = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll(match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                });
            }
            WindowEvent::Focused(false) => {
                // Releases are not delivered to an unfocused window.
                for button in self.mouse_held.drain() {
                    self.mouse_released.insert(button);
                }
            }
            _ => {}
        }
    }

    /// Record a button press at `now`.
    pub fn press(&mut self, button: MouseButton, now: Instant) {
        self.mouse_pressed.insert(button);
        self.mouse_held.insert(button);

        if button != MouseButton::Left {
            return;
        }
        let position = self.mouse_position.unwrap_or(Vec2::ZERO);
        match self.last_click {
            Some((time, last))
                if now.saturating_duration_since(time) <= DOUBLE_CLICK_INTERVAL
                    && position.distance(last) <= DOUBLE_CLICK_DISTANCE =>
            {
                self.double_clicked = true;
                // A third press starts a new pair.
                self.last_click = None;
            }
            _ => self.last_click = Some((now, position)),
        }
    }

    /// Record a button release.
    pub fn release(&mut self, button: MouseButton) {
        self.mouse_held.remove(&button);
        self.mouse_released.insert(button);
    }

    /// Record the cursor moving to `position`.
    pub fn move_cursor(&mut self, position: Vec2) {
        if let Some(last) = self.mouse_position {
            self.mouse_delta += position - last;
        }
        self.mouse_position = Some(position);
    }

    /// Record wheel movement in lines.
    pub fn scroll(&mut self, lines: f32) {
        self.scroll_delta += lines;
    }
}
