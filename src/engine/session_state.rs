use crate::engine::Session;
use crate::types::{Direction, Intent, SessionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Enter(SessionState),
    ResetAndPlay,
}

pub fn next_transition(state: SessionState, intent: Intent) -> Transition {
    match intent {
        Intent::SetIntendedHeading(_) => Transition::Stay,
        Intent::TogglePause => match state {
            SessionState::Playing => Transition::Enter(SessionState::Paused),
            SessionState::Paused => Transition::Enter(SessionState::Playing),
            _ => Transition::Stay,
        },
        Intent::Start => match state {
            SessionState::Start | SessionState::GameOver | SessionState::Win => {
                Transition::ResetAndPlay
            }
            SessionState::Paused => Transition::Enter(SessionState::Playing),
            SessionState::Playing => Transition::Stay,
        },
        Intent::StartOrPause => match state {
            SessionState::Start => Transition::ResetAndPlay,
            _ => next_transition(state, Intent::TogglePause),
        },
        Intent::Restart => Transition::ResetAndPlay,
    }
}

impl Session {
    pub(super) fn apply_intent(&mut self, intent: Intent) {
        if let Intent::SetIntendedHeading(dir) = intent {
            if self.state == SessionState::Playing && dir != Direction::None {
                self.player.view.next_dir = dir;
            }
            return;
        }

        match next_transition(self.state, intent) {
            Transition::Stay => {}
            Transition::Enter(next) => self.enter_state(next),
            Transition::ResetAndPlay => {
                self.reset_run();
                self.enter_state(SessionState::Playing);
            }
        }
    }
}
