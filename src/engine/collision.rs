use crate::constants::{CONTACT_DISTANCE, GHOST_CAPTURE_SCORE};
use crate::engine::utils::manhattan;
use crate::engine::Session;
use crate::types::{Position, RuntimeEvent, SessionState, Vec2};

pub fn in_contact(player: Position, ghost: Vec2) -> bool {
    manhattan(player, ghost.to_position()) < CONTACT_DISTANCE
}

impl Session {
    /// At most one life is lost per tick.
    pub(super) fn resolve_collisions(&mut self) {
        let power_active = self.power.is_active();
        for ghost_idx in 0..self.ghosts.len() {
            let player = self.player.position();
            let ghost = self.ghosts[ghost_idx].cell();
            if !in_contact(player, ghost) {
                continue;
            }

            let vulnerable = self.ghosts[ghost_idx].view.vulnerable;
            if vulnerable && power_active {
                self.capture_ghost(ghost_idx);
            } else if !vulnerable && !power_active {
                self.lose_life();
                return;
            }
        }
    }

    fn capture_ghost(&mut self, ghost_idx: usize) {
        self.add_score(GHOST_CAPTURE_SCORE);
        self.ghosts_eaten += 1;
        let ghost = &mut self.ghosts[ghost_idx];
        ghost.send_home();
        ghost.view.vulnerable = false;
        let event = RuntimeEvent::GhostEaten {
            ghost_id: ghost.view.id,
            color: ghost.view.color,
        };
        self.push_event(event);
    }

    fn lose_life(&mut self) {
        self.lives = (self.lives - 1).max(0);
        self.lives_lost += 1;
        self.push_event(RuntimeEvent::LifeLost {
            lives_left: self.lives,
        });
        if self.lives <= 0 {
            self.enter_state(SessionState::GameOver);
            return;
        }
        self.player.reset();
        for ghost in &mut self.ghosts {
            ghost.send_home();
        }
    }
}
