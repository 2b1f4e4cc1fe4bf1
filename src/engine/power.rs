use crate::constants::{POWER_DURATION_MS, POWER_ENDING_MS};
use crate::types::PowerView;

#[derive(Clone, Debug, Default)]
pub struct PowerState {
    active: bool,
    remaining_ms: f64,
}

impl PowerState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.remaining_ms = POWER_DURATION_MS;
    }

    /// True on the tick the timer runs out.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms > 0.0 {
            return false;
        }
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.remaining_ms = 0.0;
    }

    pub fn view(&self) -> PowerView {
        PowerView {
            active: self.active,
            remaining_ms: self.remaining_ms,
            ending: self.active && self.remaining_ms < POWER_ENDING_MS,
        }
    }
}
