use fractaldive_core::{InputAction, InputSnapshot, Variant};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Physical key bound to `action`, if any.
pub fn action_for(key: KeyCode) -> Option<InputAction> {
    let action = match key {
        KeyCode::ArrowUp => InputAction::PanUp,
        KeyCode::ArrowDown => InputAction::PanDown,
        KeyCode::ArrowLeft => InputAction::PanLeft,
        KeyCode::ArrowRight => InputAction::PanRight,
        KeyCode::KeyZ => InputAction::ZoomIn,
        KeyCode::KeyX => InputAction::ZoomOut,
        KeyCode::Digit1 | KeyCode::Numpad1 => InputAction::SelectVariant(Variant::Mandelbrot),
        KeyCode::Digit2 | KeyCode::Numpad2 => InputAction::SelectVariant(Variant::Julia),
        KeyCode::Digit3 | KeyCode::Numpad3 => InputAction::SelectVariant(Variant::BurningShip),
        KeyCode::Digit4 | KeyCode::Numpad4 => InputAction::SelectVariant(Variant::Tricorn),
        KeyCode::Escape => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Tracks which bound keys are held between frames.
///
/// Pan and zoom are level-triggered. Variant selection and quit are sticky:
/// a press is remembered until the next [`HeldKeys::snapshot`], so a tap that
/// is released before the frame samples input still takes effect.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeldKeys {
    snapshot: InputSnapshot,
    latched: InputSnapshot,
}

fn is_sticky(action: InputAction) -> bool {
    matches!(action, InputAction::SelectVariant(_) | InputAction::Quit)
}

impl HeldKeys {
    pub fn handle_key_event(&mut self, key: KeyCode, state: ElementState) {
        let Some(action) = action_for(key) else {
            return;
        };
        let pressed = state == ElementState::Pressed;
        self.snapshot.set(action, pressed);
        if pressed && is_sticky(action) {
            self.latched.set(action, true);
        }
    }

    /// Window close behaves like the quit key.
    pub fn request_quit(&mut self) {
        self.snapshot.set(InputAction::Quit, true);
    }

    /// Current input for one frame. Consumes latched taps.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let mut snapshot = self.snapshot;
        for (held, tapped) in snapshot.select.iter_mut().zip(self.latched.select) {
            *held |= tapped;
        }
        snapshot.quit |= self.latched.quit;
        self.latched = InputSnapshot::default();
        snapshot
    }

    /// Release everything, e.g. when the window loses focus. Taps already
    /// latched still reach the next snapshot.
    pub fn reset(&mut self) {
        self.snapshot = InputSnapshot {
            quit: self.snapshot.quit,
            ..InputSnapshot::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_pan_and_z_x_zoom() {
        assert_eq!(action_for(KeyCode::ArrowUp), Some(InputAction::PanUp));
        assert_eq!(action_for(KeyCode::ArrowRight), Some(InputAction::PanRight));
        assert_eq!(action_for(KeyCode::KeyZ), Some(InputAction::ZoomIn));
        assert_eq!(action_for(KeyCode::KeyX), Some(InputAction::ZoomOut));
    }

    #[test]
    fn digit_keys_select_variants_in_order() {
        let keys = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4];
        for (key, variant) in keys.into_iter().zip(Variant::ALL) {
            assert_eq!(action_for(key), Some(InputAction::SelectVariant(variant)));
        }
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut held = HeldKeys::default();
        held.handle_key_event(KeyCode::KeyQ, ElementState::Pressed);
        assert_eq!(held.snapshot(), InputSnapshot::default());
    }

    #[test]
    fn key_stays_active_until_released() {
        let mut held = HeldKeys::default();
        held.handle_key_event(KeyCode::ArrowLeft, ElementState::Pressed);
        assert!(held.snapshot().pan_left);
        assert!(held.snapshot().pan_left);

        held.handle_key_event(KeyCode::ArrowLeft, ElementState::Released);
        assert!(!held.snapshot().pan_left);
    }

    #[test]
    fn tapped_select_and_quit_survive_until_next_snapshot() {
        let mut held = HeldKeys::default();
        for key in [KeyCode::Digit2, KeyCode::Escape] {
            held.handle_key_event(key, ElementState::Pressed);
            held.handle_key_event(key, ElementState::Released);
        }

        let snapshot = held.snapshot();
        assert!(snapshot.select[Variant::Julia.slot()]);
        assert!(snapshot.quit);

        let next = held.snapshot();
        assert!(!next.select[Variant::Julia.slot()]);
        assert!(!next.quit);
    }

    #[test]
    fn tapped_pan_is_not_latched() {
        let mut held = HeldKeys::default();
        held.handle_key_event(KeyCode::ArrowUp, ElementState::Pressed);
        held.handle_key_event(KeyCode::ArrowUp, ElementState::Released);
        assert_eq!(held.snapshot(), InputSnapshot::default());
    }

    #[test]
    fn held_select_key_stays_active_after_latch_is_consumed() {
        let mut held = HeldKeys::default();
        held.handle_key_event(KeyCode::Digit3, ElementState::Pressed);
        assert!(held.snapshot().select[Variant::BurningShip.slot()]);
        assert!(held.snapshot().select[Variant::BurningShip.slot()]);
    }

    #[test]
    fn reset_releases_keys_but_keeps_quit() {
        let mut held = HeldKeys::default();
        held.handle_key_event(KeyCode::KeyZ, ElementState::Pressed);
        held.request_quit();
        held.reset();

        let snapshot = held.snapshot();
        assert!(!snapshot.zoom_in);
        assert!(snapshot.quit);
    }
}
