// fractaldive-core/src/input.rs

use crate::{ControlProfile, Variant, ViewState};

/// Logical actions recognised by the viewer, independent of physical keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    ZoomIn,
    ZoomOut,
    SelectVariant(Variant),
    Quit,
}

/// Pressed state of every action, sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub pan_up: bool,
    pub pan_down: bool,
    pub pan_left: bool,
    pub pan_right: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
    pub select: [bool; 4],
    pub quit: bool,
}

impl InputSnapshot {
    pub fn set(&mut self, action: InputAction, pressed: bool) {
        match action {
            InputAction::PanUp => self.pan_up = pressed,
            InputAction::PanDown => self.pan_down = pressed,
            InputAction::PanLeft => self.pan_left = pressed,
            InputAction::PanRight => self.pan_right = pressed,
            InputAction::ZoomIn => self.zoom_in = pressed,
            InputAction::ZoomOut => self.zoom_out = pressed,
            InputAction::SelectVariant(v) => self.select[v.slot()] = pressed,
            InputAction::Quit => self.quit = pressed,
        }
    }

    /// Builder form of `set(action, true)`.
    pub fn with(mut self, action: InputAction) -> Self {
        self.set(action, true);
        self
    }

    pub fn is_active(&self, action: InputAction) -> bool {
        match action {
            InputAction::PanUp => self.pan_up,
            InputAction::PanDown => self.pan_down,
            InputAction::PanLeft => self.pan_left,
            InputAction::PanRight => self.pan_right,
            InputAction::ZoomIn => self.zoom_in,
            InputAction::ZoomOut => self.zoom_out,
            InputAction::SelectVariant(v) => self.select[v.slot()],
            InputAction::Quit => self.quit,
        }
    }
}

/// What the frame loop should do after input was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameCommand {
    Continue,
    Quit,
}

/// Turns a per-frame `InputSnapshot` into a `ViewState` update.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputController {
    profile: ControlProfile,
}

impl InputController {
    pub fn new(profile: ControlProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ControlProfile {
        &self.profile
    }

    /// Apply every active action to `view`.
    ///
    /// Order: pan (step taken from the zoom at the start of the frame), then
    /// zoom, then variant selection in ascending variant order. A selection
    /// replaces center and zoom, so it overrides pan and zoom of the same
    /// frame; with several selections held the highest variant wins.
    ///
    /// Panning follows the content: pan-left moves the view toward +re and
    /// pan-up moves it toward -im.
    pub fn apply(&self, input: &InputSnapshot, view: &mut ViewState) -> FrameCommand {
        let step = self.profile.step_base * view.zoom();

        let mut dx = 0.0;
        let mut dy = 0.0;
        if input.pan_up {
            dy -= step;
        }
        if input.pan_down {
            dy += step;
        }
        if input.pan_left {
            dx += step;
        }
        if input.pan_right {
            dx -= step;
        }
        if dx != 0.0 || dy != 0.0 {
            view.pan(dx, dy);
        }

        if input.zoom_in {
            view.scale_zoom(self.profile.zoom_in_factor);
        }
        if input.zoom_out {
            view.scale_zoom(self.profile.zoom_out_factor);
        }

        for variant in Variant::ALL {
            if input.select[variant.slot()] {
                view.select(variant, self.profile.presets.get(variant));
                log::debug!("Selected {variant}");
            }
        }

        if input.quit {
            FrameCommand::Quit
        } else {
            FrameCommand::Continue
        }
    }
}
