use std::collections::VecDeque;

use crate::constants::{
    GHOST_MOVE_INTERVAL_MS, GHOST_ROSTER, MAX_PENDING_EVENTS, MOUTH_MAX, MOUTH_RATE,
    PELLET_SCORE, PLAYER_SPEED, PLAYER_START, POWER_PELLET_SCORE, STARTING_LIVES,
};
use crate::maze::{CollectibleLedger, Maze, MazeError};
use crate::score_store::ScoreStore;
use crate::types::{
    CellKind, Direction, GameSummary, GhostView, Intent, PlayerView, Position,
    RuntimeEvent, SessionState, Snapshot, Vec2,
};

pub mod collision;
pub mod ghost_policy;
pub mod motion;
pub mod power;
pub mod session_state;
pub mod utils;

use self::ghost_policy::PolicyInput;
use self::power::PowerState;

#[derive(Clone, Debug)]
struct PlayerInternal {
    view: PlayerView,
    mouth_speed: f64,
    spawn: Vec2,
}

impl PlayerInternal {
    fn new(spawn: Vec2) -> Self {
        Self {
            view: PlayerView {
                x: spawn.x as f64,
                y: spawn.y as f64,
                dir: Direction::None,
                next_dir: Direction::None,
                mouth_open: 0.0,
            },
            mouth_speed: MOUTH_RATE,
            spawn,
        }
    }

    fn position(&self) -> Position {
        Position {
            x: self.view.x,
            y: self.view.y,
        }
    }

    fn reset(&mut self) {
        self.view.x = self.spawn.x as f64;
        self.view.y = self.spawn.y as f64;
        self.view.dir = Direction::None;
        self.view.next_dir = Direction::None;
    }

    fn animate_mouth(&mut self) {
        self.view.mouth_open += self.mouth_speed;
        if self.view.mouth_open > MOUTH_MAX || self.view.mouth_open < 0.0 {
            self.mouth_speed = -self.mouth_speed;
        }
    }
}

#[derive(Clone, Debug)]
struct GhostInternal {
    view: GhostView,
    home: Vec2,
    scatter_target: Vec2,
}

impl GhostInternal {
    fn cell(&self) -> Vec2 {
        Vec2 {
            x: self.view.x,
            y: self.view.y,
        }
    }

    fn send_home(&mut self) {
        self.view.x = self.home.x;
        self.view.y = self.home.y;
    }

    fn policy_input(&self, power_active: bool) -> PolicyInput {
        PolicyInput {
            cell: self.cell(),
            dir: self.view.dir,
            mode: self.view.mode,
            scatter_target: self.scatter_target,
            fleeing: self.view.vulnerable && power_active,
        }
    }
}

fn build_ghosts() -> Vec<GhostInternal> {
    GHOST_ROSTER
        .iter()
        .enumerate()
        .map(|(id, spec)| GhostInternal {
            view: GhostView {
                id,
                x: spec.home.x,
                y: spec.home.y,
                dir: spec.dir,
                color: spec.color,
                color_hex: spec.color.hex(),
                mode: spec.mode,
                vulnerable: false,
            },
            home: spec.home,
            scatter_target: spec.scatter_target,
        })
        .collect()
}

pub struct Session {
    maze: Maze,
    ledger: CollectibleLedger,
    player: PlayerInternal,
    ghosts: Vec<GhostInternal>,
    power: PowerState,
    state: SessionState,
    score: u32,
    high_score: u32,
    lives: i32,
    ghost_move_timer_ms: f64,
    intents: VecDeque<Intent>,
    events: Vec<RuntimeEvent>,
    score_store: Box<dyn ScoreStore>,

    tick_counter: u64,
    elapsed_ms: f64,
    ghosts_eaten: u32,
    lives_lost: u32,
}

impl Session {
    pub fn new(score_store: Box<dyn ScoreStore>) -> Result<Self, MazeError> {
        Ok(Self::with_maze(Maze::reference()?, score_store))
    }

    pub fn with_maze(maze: Maze, score_store: Box<dyn ScoreStore>) -> Self {
        let ledger = CollectibleLedger::from_maze(&maze);
        let high_score = score_store.get();
        Self {
            maze,
            ledger,
            player: PlayerInternal::new(PLAYER_START),
            ghosts: build_ghosts(),
            power: PowerState::default(),
            state: SessionState::Start,
            score: 0,
            high_score,
            lives: STARTING_LIVES,
            ghost_move_timer_ms: 0.0,
            intents: VecDeque::new(),
            events: Vec::new(),
            score_store,
            tick_counter: 0,
            elapsed_ms: 0.0,
            ghosts_eaten: 0,
            lives_lost: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn ledger(&self) -> &CollectibleLedger {
        &self.ledger
    }

    pub fn power(&self) -> &PowerState {
        &self.power
    }

    pub fn score_store(&self) -> &dyn ScoreStore {
        self.score_store.as_ref()
    }

    pub fn player(&self) -> &PlayerView {
        &self.player.view
    }

    pub fn player_position(&self) -> Position {
        self.player.position()
    }

    pub fn ghosts(&self) -> impl Iterator<Item = &GhostView> {
        self.ghosts.iter().map(|ghost| &ghost.view)
    }

    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push_back(intent);
    }

    pub fn update(&mut self, dt_ms: f64) {
        while let Some(intent) = self.intents.pop_front() {
            self.apply_intent(intent);
        }
        self.step(dt_ms);
    }

    pub fn step(&mut self, dt_ms: f64) {
        if self.state != SessionState::Playing {
            return;
        }
        let dt_ms = dt_ms.max(0.0);
        self.tick_counter += 1;
        self.elapsed_ms += dt_ms;

        self.update_player();
        if self.state != SessionState::Playing {
            return;
        }

        self.ghost_move_timer_ms += dt_ms;
        if self.ghost_move_timer_ms >= GHOST_MOVE_INTERVAL_MS {
            self.ghost_move_timer_ms = 0.0;
            self.update_ghosts();
        }

        self.resolve_collisions();
        if self.state != SessionState::Playing {
            return;
        }

        if self.power.tick(dt_ms) {
            self.set_all_vulnerable(false);
            self.push_event(RuntimeEvent::PowerModeEnded);
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            state: self.state,
            score: self.score,
            high_score: self.high_score,
            lives: self.lives,
            collected: self.ledger.collected,
            total_collectible: self.ledger.total,
            power: self.power.view(),
            player: self.player.view.clone(),
            ghosts: self.ghosts.iter().map(|ghost| ghost.view.clone()).collect(),
            tiles: self.maze.rows(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            state: self.state,
            score: self.score,
            high_score: self.high_score,
            lives: self.lives,
            collected: self.ledger.collected,
            total_collectible: self.ledger.total,
            ghosts_eaten: self.ghosts_eaten,
            lives_lost: self.lives_lost,
            elapsed_ms: self.elapsed_ms,
            ticks: self.tick_counter,
        }
    }

    fn update_player(&mut self) {
        let outcome = motion::resolve_intent(
            &self.maze,
            self.player.position(),
            self.player.view.dir,
            self.player.view.next_dir,
            PLAYER_SPEED,
        );
        self.player.view.dir = outcome.dir;
        if outcome.moved {
            self.player.view.x = outcome.position.x;
            self.player.view.y = outcome.position.y;
            self.player.animate_mouth();
        }

        let cell = self.maze.wrap_cell(self.player.position().cell());
        match self.maze.consume(cell) {
            CellKind::Pellet => {
                self.ledger.record();
                self.add_score(PELLET_SCORE);
                self.push_event(RuntimeEvent::PelletEaten {
                    x: cell.x,
                    y: cell.y,
                });
            }
            CellKind::PowerPellet => {
                self.ledger.record();
                self.add_score(POWER_PELLET_SCORE);
                self.push_event(RuntimeEvent::PowerPelletEaten {
                    x: cell.x,
                    y: cell.y,
                });
                self.activate_power();
            }
            _ => return,
        }

        if self.ledger.is_cleared() {
            self.enter_state(SessionState::Win);
        }
    }

    fn update_ghosts(&mut self) {
        let player = self.player.position();
        let power_active = self.power.is_active();
        for ghost in &mut self.ghosts {
            let dir = ghost_policy::choose_heading(&self.maze, &ghost.policy_input(power_active), player);
            let next = ghost_policy::step_cell(&self.maze, ghost.cell(), dir);
            ghost.view.dir = dir;
            ghost.view.x = next.x;
            ghost.view.y = next.y;
        }
    }

    /// Pending events are capped; the oldest are dropped when no host drains
    /// them through `build_snapshot(true)`.
    fn push_event(&mut self, event: RuntimeEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    fn activate_power(&mut self) {
        self.power.activate();
        self.set_all_vulnerable(true);
        self.push_event(RuntimeEvent::PowerModeStarted);
    }

    fn set_all_vulnerable(&mut self, vulnerable: bool) {
        for ghost in &mut self.ghosts {
            ghost.view.vulnerable = vulnerable;
        }
    }

    fn add_score(&mut self, points: u32) {
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
            self.score_store.set(self.high_score);
            self.push_event(RuntimeEvent::HighScoreUpdated {
                score: self.high_score,
            });
        }
    }

    fn enter_state(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        self.push_event(RuntimeEvent::StateChanged {
            from: self.state,
            to: next,
        });
        self.state = next;
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.power.clear();
        self.ghost_move_timer_ms = 0.0;
        self.maze.reset_collectibles();
        self.ledger.reset();
        self.player = PlayerInternal::new(self.player.spawn);
        for ghost in &mut self.ghosts {
            ghost.send_home();
            ghost.view.dir = Direction::Up;
            ghost.view.vulnerable = false;
        }
        self.tick_counter = 0;
        self.elapsed_ms = 0.0;
        self.ghosts_eaten = 0;
        self.lives_lost = 0;
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{
        FRAME_MS, GHOST_ROSTER, GRID_HEIGHT, GRID_WIDTH, MAX_PENDING_EVENTS, PLAYER_START,
    };
    use crate::engine::Session;
    use crate::maze::Maze;
    use crate::score_store::{MemoryScoreStore, ScoreStore};
    use crate::types::{CellKind, Direction, Intent, RuntimeEvent, SessionState, Vec2};

    fn new_session() -> Session {
        Session::new(Box::new(MemoryScoreStore::default())).expect("reference maze parses")
    }

    fn playing_session() -> Session {
        let mut session = new_session();
        session.push_intent(Intent::Start);
        session.update(0.0);
        assert_eq!(session.state(), SessionState::Playing);
        session
    }

    fn park_ghosts(session: &mut Session) {
        for ghost in &mut session.ghosts {
            ghost.view.x = ghost.home.x;
            ghost.view.y = ghost.home.y;
        }
        session.ghost_move_timer_ms = f64::NEG_INFINITY;
    }

    /// Full-size board that is solid wall except a single pellet at (1, 1)
    /// and the open run of row 1 beside it.
    fn one_pellet_maze() -> Maze {
        let width = GRID_WIDTH as usize;
        let rows: Vec<String> = (0..GRID_HEIGHT)
            .map(|y| {
                if y == 1 {
                    format!("#.{}#", " ".repeat(width - 3))
                } else {
                    "#".repeat(width)
                }
            })
            .collect();
        Maze::parse(rows.as_slice()).expect("one pellet maze parses")
    }

    #[test]
    fn new_session_waits_in_start_with_frozen_world() {
        let mut session = new_session();
        assert_eq!(session.state(), SessionState::Start);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.ledger().total, 240);

        session.push_intent(Intent::SetIntendedHeading(Direction::Left));
        session.update(FRAME_MS as f64);
        assert_eq!(session.player().next_dir, Direction::None);
        assert_eq!(session.build_snapshot(false).tick, 0);
    }

    #[test]
    fn heading_intent_moves_player_once_playing() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.push_intent(Intent::SetIntendedHeading(Direction::Left));
        session.update(FRAME_MS as f64);
        assert_eq!(session.player().dir, Direction::Left);
        assert!((session.player().x - 13.92).abs() < 1e-9);
        assert_eq!(session.player().y, PLAYER_START.y as f64);
    }

    #[test]
    fn last_pellet_wins_and_scores_ten() {
        let mut session =
            Session::with_maze(one_pellet_maze(), Box::new(MemoryScoreStore::default()));
        assert_eq!(session.ledger().total, 1);
        session.push_intent(Intent::Start);
        session.update(0.0);
        park_ghosts(&mut session);
        session.player.view.x = 1.04;
        session.player.view.y = 1.0;
        session.player.view.dir = Direction::Left;

        let before = session.score();
        session.update(FRAME_MS as f64);

        assert_eq!(session.ledger().collected, session.ledger().total);
        assert_eq!(session.state(), SessionState::Win);
        assert_eq!(session.score(), before + 10);
    }

    #[test]
    fn all_but_one_pellet_does_not_win() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.ledger.collected = session.ledger.total - 2;
        session.player.view.x = 1.0;
        session.player.view.y = 1.0;

        session.update(FRAME_MS as f64);
        assert_eq!(session.ledger().collected, session.ledger().total - 1);
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn power_pellet_expires_after_duration() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.player.view.x = 1.0;
        session.player.view.y = 3.0;

        session.update(0.0);
        assert!(session.power().is_active());
        assert_eq!(session.power().remaining_ms(), 7_000.0);
        assert!(session.ghosts().all(|ghost| ghost.vulnerable));
        assert_eq!(session.score(), 50);

        let mut elapsed = 0.0;
        while elapsed < 7_001.0 {
            session.update(1.0);
            elapsed += 1.0;
            for ghost in session.ghosts() {
                assert!(!ghost.vulnerable || session.power().is_active());
            }
        }
        assert!(!session.power().is_active());
        assert!(session.ghosts().all(|ghost| !ghost.vulnerable));
        let events = session.build_snapshot(true).events;
        assert!(events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::PowerModeEnded)));
    }

    #[test]
    fn contact_with_last_life_ends_the_game() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.lives = 1;
        session.ghosts[0].view.x = PLAYER_START.x;
        session.ghosts[0].view.y = PLAYER_START.y;

        session.update(FRAME_MS as f64);
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.lives(), 0);

        let frozen = session.build_snapshot(false);
        session.update(FRAME_MS as f64);
        assert_eq!(session.build_snapshot(false).tick, frozen.tick);
    }

    #[test]
    fn life_loss_resets_player_and_every_ghost() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.player.view.x = 6.0;
        session.player.view.y = 5.0;
        session.player.view.dir = Direction::None;
        session.ghosts[0].view.x = 6;
        session.ghosts[0].view.y = 5;
        session.ghosts[1].view.x = 20;
        session.ghosts[1].view.y = 29;
        session.ghosts[1].view.dir = Direction::Left;

        session.update(FRAME_MS as f64);
        assert_eq!(session.lives(), 2);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.player_position(), PLAYER_START.to_position());
        assert_eq!(session.player().dir, Direction::None);
        for (ghost, spec) in session.ghosts().zip(GHOST_ROSTER.iter()) {
            assert_eq!(Vec2 { x: ghost.x, y: ghost.y }, spec.home);
        }
        assert_eq!(session.ghosts[1].view.dir, Direction::Left);
    }

    #[test]
    fn vulnerable_ghost_is_captured_for_bonus() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.player.view.x = 6.0;
        session.player.view.y = 5.0;
        session.power.activate();
        for ghost in &mut session.ghosts {
            ghost.view.vulnerable = true;
        }
        session.ghosts[2].view.x = 6;
        session.ghosts[2].view.y = 5;
        let before = session.score();

        session.update(FRAME_MS as f64);
        // The pellet at (6,5) is eaten on the same tick.
        assert_eq!(session.score(), before + 10 + 200);
        assert_eq!(session.lives(), 3);
        let ghost = &session.ghosts[2];
        assert_eq!(ghost.cell(), ghost.home);
        assert!(!ghost.view.vulnerable);
        assert!(session.ghosts[0].view.vulnerable);
    }

    #[test]
    fn power_pellet_protects_on_the_same_tick() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.player.view.x = 26.0;
        session.player.view.y = 23.0;
        session.ghosts[0].view.x = 26;
        session.ghosts[0].view.y = 23;

        session.update(FRAME_MS as f64);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.score(), 50 + 200);
        assert_eq!(session.ghosts[0].cell(), session.ghosts[0].home);
    }

    #[test]
    fn ghosts_only_move_on_the_coarse_interval() {
        let mut session = playing_session();
        let start: Vec<Vec2> = session.ghosts.iter().map(|ghost| ghost.cell()).collect();
        session.update(150.0);
        let after_short: Vec<Vec2> = session.ghosts.iter().map(|ghost| ghost.cell()).collect();
        assert_eq!(start, after_short);

        session.update(60.0);
        let moved = session
            .ghosts
            .iter()
            .zip(start.iter())
            .filter(|(ghost, before)| ghost.cell() != **before)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn ghosts_never_reverse_when_another_option_exists() {
        let mut session = playing_session();
        session.push_intent(Intent::SetIntendedHeading(Direction::Left));
        for _ in 0..2_000 {
            let before: Vec<(Vec2, Direction)> = session
                .ghosts
                .iter()
                .map(|ghost| (ghost.cell(), ghost.view.dir))
                .collect();
            session.update(FRAME_MS as f64);
            if session.state() != SessionState::Playing {
                break;
            }
            for (ghost, (cell, dir)) in session.ghosts.iter().zip(before) {
                let legal = super::ghost_policy::legal_headings(&session.maze, cell, dir);
                if !legal.is_empty() {
                    assert_ne!(ghost.view.dir, dir.opposite());
                }
            }
        }
    }

    #[test]
    fn score_never_decreases_and_high_score_tracks_max() {
        let mut session = playing_session();
        let mut max_score = 0;
        let dirs = [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Down,
        ];
        for frame in 0..5_000 {
            if frame % 120 == 0 {
                session.push_intent(Intent::SetIntendedHeading(dirs[(frame / 120) % 4]));
            }
            let before = session.score();
            session.update(FRAME_MS as f64);
            assert!(session.score() >= before);
            max_score = max_score.max(session.score());
            assert_eq!(session.high_score(), max_score);
            if session.state() != SessionState::Playing {
                break;
            }
        }
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut session = playing_session();
        session.push_intent(Intent::SetIntendedHeading(Direction::Left));
        session.update(FRAME_MS as f64);
        session.push_intent(Intent::TogglePause);
        session.update(FRAME_MS as f64);
        assert_eq!(session.state(), SessionState::Paused);

        let frozen = session.player_position();
        for _ in 0..10 {
            session.update(FRAME_MS as f64);
        }
        assert_eq!(session.player_position(), frozen);

        session.push_intent(Intent::SetIntendedHeading(Direction::Right));
        session.push_intent(Intent::TogglePause);
        session.update(FRAME_MS as f64);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.player().next_dir, Direction::Left);
        assert_ne!(session.player_position(), frozen);
    }

    #[test]
    fn restart_reinitialises_but_keeps_high_score() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        session.player.view.x = 1.0;
        session.player.view.y = 3.0;
        session.update(0.0);
        assert_eq!(session.score(), 50);
        session.lives = 1;

        session.push_intent(Intent::Restart);
        session.update(0.0);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.high_score(), 50);
        assert_eq!(session.lives(), 3);
        assert_eq!(session.ledger().collected, 0);
        assert!(!session.power().is_active());
        assert_eq!(session.ledger().total, 240);
        assert_eq!(session.maze().cell_kind_at(Vec2 { x: 1, y: 3 }), CellKind::Empty);
        assert_eq!(session.player_position(), PLAYER_START.to_position());
        assert!(session
            .ghosts()
            .all(|ghost| ghost.dir == Direction::Up && !ghost.vulnerable));
    }

    #[test]
    fn starting_again_after_game_over_keeps_eaten_pellets_eaten() {
        let mut session = playing_session();
        park_ghosts(&mut session);
        assert_eq!(session.maze.consume(Vec2 { x: 1, y: 1 }), CellKind::Pellet);
        assert_eq!(session.maze.consume(Vec2 { x: 1, y: 2 }), CellKind::Pellet);
        session.enter_state(SessionState::GameOver);

        session.push_intent(Intent::Start);
        session.update(0.0);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.maze().cell_kind_at(Vec2 { x: 1, y: 1 }), CellKind::Empty);
        assert_eq!(session.maze().cell_kind_at(Vec2 { x: 1, y: 2 }), CellKind::Empty);
        assert_eq!(session.ledger().total, 240);
        assert_eq!(session.ledger().collected, 0);
    }

    #[test]
    fn space_from_title_starts_the_run_then_pauses() {
        let mut session = new_session();
        session.push_intent(Intent::StartOrPause);
        session.update(0.0);
        assert_eq!(session.state(), SessionState::Playing);

        session.push_intent(Intent::StartOrPause);
        session.update(0.0);
        assert_eq!(session.state(), SessionState::Paused);
    }

    #[test]
    fn undrained_events_are_capped() {
        let mut session = playing_session();
        session.build_snapshot(true);
        for lives_left in 0..(MAX_PENDING_EVENTS as i32 + 10) {
            session.push_event(RuntimeEvent::LifeLost { lives_left });
        }
        let events = session.build_snapshot(true).events;
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert!(matches!(
            events.first(),
            Some(RuntimeEvent::LifeLost { lives_left: 10 })
        ));
    }

    #[test]
    fn high_score_is_read_from_and_written_to_the_store() {
        struct SharedStore(std::sync::Arc<std::sync::Mutex<u32>>);
        impl ScoreStore for SharedStore {
            fn get(&self) -> u32 {
                *self.0.lock().expect("store lock")
            }
            fn set(&mut self, value: u32) {
                *self.0.lock().expect("store lock") = value;
            }
        }

        let shared = std::sync::Arc::new(std::sync::Mutex::new(30));
        let maze = Maze::reference().expect("reference maze parses");
        let mut session = Session::with_maze(maze, Box::new(SharedStore(shared.clone())));
        assert_eq!(session.high_score(), 30);

        session.push_intent(Intent::Start);
        session.update(0.0);
        park_ghosts(&mut session);
        session.player.view.x = 1.0;
        session.player.view.y = 3.0;
        session.update(0.0);
        assert_eq!(session.high_score(), 50);
        assert_eq!(*shared.lock().expect("store lock"), 50);
    }

    #[test]
    fn snapshot_drains_events_when_requested() {
        let mut session = playing_session();
        let first = session.build_snapshot(true);
        assert!(first.events.iter().any(|event| matches!(
            event,
            RuntimeEvent::StateChanged {
                to: SessionState::Playing,
                ..
            }
        )));
        assert!(session.build_snapshot(true).events.is_empty());
        assert_eq!(first.tiles.len(), 31);
    }
}
