//! Edge-triggered input handling.
//!
//! Each recognized action tracks its previously-pressed state and fires
//! only on the rising edge, so one physical key press produces exactly one
//! action even when the same state is observed across several frames.

/// Actions the simulation responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    NextPattern,
    CellSizeUp,
    CellSizeDown,
    SpeedUp,
    SpeedDown,
    TogglePause,
    StepOnce,
    Quit,
}

/// Raw pressed flags for one frame, as sampled from the input device.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyStates {
    pub next_pattern: bool,
    pub cell_size_up: bool,
    pub cell_size_down: bool,
    pub speed_up: bool,
    pub speed_down: bool,
    pub toggle_pause: bool,
    pub step_once: bool,
    pub quit: bool,
}

#[derive(Debug, Default)]
struct EdgeTrigger {
    previously_pressed: bool,
}

impl EdgeTrigger {
    /// True only when pressed now and not on the previous observation.
    fn rising(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.previously_pressed;
        self.previously_pressed = pressed;
        fired
    }
}

/// Converts per-frame key states into edge-triggered actions.
#[derive(Debug, Default)]
pub struct InputController {
    next_pattern: EdgeTrigger,
    cell_size_up: EdgeTrigger,
    cell_size_down: EdgeTrigger,
    speed_up: EdgeTrigger,
    speed_down: EdgeTrigger,
    toggle_pause: EdgeTrigger,
    step_once: EdgeTrigger,
    quit: EdgeTrigger,
}

impl InputController {
    /// Feed one frame's key states and collect the actions that fired.
    pub fn actions(&mut self, states: &KeyStates) -> Vec<InputAction> {
        let mut fired = Vec::new();
        if self.next_pattern.rising(states.next_pattern) {
            fired.push(InputAction::NextPattern);
        }
        if self.cell_size_up.rising(states.cell_size_up) {
            fired.push(InputAction::CellSizeUp);
        }
        if self.cell_size_down.rising(states.cell_size_down) {
            fired.push(InputAction::CellSizeDown);
        }
        if self.speed_up.rising(states.speed_up) {
            fired.push(InputAction::SpeedUp);
        }
        if self.speed_down.rising(states.speed_down) {
            fired.push(InputAction::SpeedDown);
        }
        if self.toggle_pause.rising(states.toggle_pause) {
            fired.push(InputAction::TogglePause);
        }
        if self.step_once.rising(states.step_once) {
            fired.push(InputAction::StepOnce);
        }
        if self.quit.rising(states.quit) {
            fired.push(InputAction::Quit);
        }
        fired
    }

    /// Observe a frame with nothing pressed, releasing every trigger.
    pub fn release_all(&mut self) {
        let _ = self.actions(&KeyStates::default());
    }
}
