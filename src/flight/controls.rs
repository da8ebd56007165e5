use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Held-key state for the flight controls.
///
/// Arrow keys drive attitude and control surfaces, `W`/`S` the throttle.
/// The state is plain booleans; all timing lives in the flight update.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub throttle_up: bool,
    pub throttle_down: bool,
}

impl InputState {
    /// Folds a window event into the held-key state. Returns `true` when
    /// the event was one of the tracked keys.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    ..
                },
            ..
        } = event
        else {
            return false;
        };
        let pressed = *state == ElementState::Pressed;
        match code {
            KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::ArrowRight => self.right = pressed,
            KeyCode::ArrowUp => self.up = pressed,
            KeyCode::ArrowDown => self.down = pressed,
            KeyCode::KeyW => self.throttle_up = pressed,
            KeyCode::KeyS => self.throttle_down = pressed,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untracked_keys_are_ignored() {
        let mut input = InputState::default();
        assert!(!input.handle_window_event(&WindowEvent::Focused(true)));
        assert_eq!(input.left, false);
    }
}
