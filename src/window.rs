//! Window management and input mapping using winit

use std::sync::Arc;

use glam::{Vec2, Vec3};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window as WinitWindow, WindowBuilder},
};

/// Planar speed applied while a movement key is held (world units per frame)
const DRIVE_SPEED: f32 = 5.0;
/// Yaw applied per turn keypress
const TURN_STEP: f32 = std::f32::consts::PI / 8.0;
/// Distance applied per step keypress
const NUDGE_STEP: f32 = 5.0;

/// A camera or renderer command decoded from keyboard input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// Start continuous movement with the given planar delta
    Accelerate(Vec2),
    /// Stop continuous movement
    StopAccelerating,
    /// One-shot turn by the given yaw/pitch delta
    Turn(Vec2),
    /// One-shot move (x strafe, y vertical, z forward)
    Nudge(Vec3),
    /// Discard the accumulated image
    ResetAccumulation,
    /// Write the accumulated image to disk
    SaveImage,
    Exit,
}

/// Map a keyboard event to a command
///
/// W/A/S/D hold continuous movement, arrows turn and step, R resets the
/// accumulation, E exports the image.
pub fn map_key(event: &KeyEvent) -> Option<InputCommand> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };

    if event.state == ElementState::Pressed {
        if event.repeat {
            return None;
        }
        match code {
            KeyCode::KeyW => Some(InputCommand::Accelerate(Vec2::new(0.0, DRIVE_SPEED))),
            KeyCode::KeyS => Some(InputCommand::Accelerate(Vec2::new(0.0, -DRIVE_SPEED))),
            KeyCode::KeyA => Some(InputCommand::Accelerate(Vec2::new(-DRIVE_SPEED, 0.0))),
            KeyCode::KeyD => Some(InputCommand::Accelerate(Vec2::new(DRIVE_SPEED, 0.0))),
            KeyCode::ArrowLeft => Some(InputCommand::Turn(Vec2::new(-TURN_STEP, 0.0))),
            KeyCode::ArrowRight => Some(InputCommand::Turn(Vec2::new(TURN_STEP, 0.0))),
            KeyCode::ArrowUp => Some(InputCommand::Nudge(Vec3::new(0.0, 0.0, NUDGE_STEP))),
            KeyCode::ArrowDown => Some(InputCommand::Nudge(Vec3::new(0.0, 0.0, -NUDGE_STEP))),
            KeyCode::KeyR => Some(InputCommand::ResetAccumulation),
            KeyCode::KeyE => Some(InputCommand::SaveImage),
            KeyCode::Escape => Some(InputCommand::Exit),
            _ => None,
        }
    } else {
        matches!(
            code,
            KeyCode::KeyW | KeyCode::KeyS | KeyCode::KeyA | KeyCode::KeyD
        )
        .then_some(InputCommand::StopAccelerating)
    }
}

/// Wrapper around a winit window with additional state
pub struct Window {
    window: Arc<WinitWindow>,
    width: u32,
    height: u32,
    resized: bool,
    close_requested: bool,
}

impl Window {
    /// Create a new window with the given title and dimensions
    pub fn new(event_loop: &EventLoop<()>, title: &str, width: u32, height: u32) -> Self {
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(PhysicalSize::new(width, height))
                .build(event_loop)
                .expect("Failed to create window"),
        );

        Self {
            window,
            width,
            height,
            resized: false,
            close_requested: false,
        }
    }

    /// Get arc reference to the window for renderer initialization
    pub fn window_arc(&self) -> Arc<WinitWindow> {
        Arc::clone(&self.window)
    }

    /// Get current window dimensions
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check if window was resized since last frame
    pub fn was_resized(&self) -> bool {
        self.resized
    }

    /// Clear the resize flag
    pub fn clear_resize_flag(&mut self) {
        self.resized = false;
    }

    /// Check if close was requested
    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    /// Handle window events
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.width = size.width;
                self.height = size.height;
                self.resized = true;
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            _ => {}
        }
    }

    /// Request a redraw
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}
