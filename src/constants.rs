use crate::types::{Direction, GhostColor, GhostMode, Vec2};

pub const GRID_WIDTH: i32 = 28;
pub const GRID_HEIGHT: i32 = 31;

pub const FRAME_MS: u64 = 16;

pub const STARTING_LIVES: i32 = 3;
pub const PLAYER_SPEED: f64 = 0.08;
pub const PLAYER_START: Vec2 = Vec2 { x: 14, y: 23 };

pub const MOUTH_RATE: f64 = 0.3;
pub const MOUTH_MAX: f64 = 0.8;

pub const GHOST_MOVE_INTERVAL_MS: f64 = 200.0;
pub const POWER_DURATION_MS: f64 = 7_000.0;
pub const POWER_ENDING_MS: f64 = 2_000.0;
pub const CONTACT_DISTANCE: f64 = 0.5;
pub const MAX_PENDING_EVENTS: usize = 512;

pub const PELLET_SCORE: u32 = 10;
pub const POWER_PELLET_SCORE: u32 = 50;
pub const GHOST_CAPTURE_SCORE: u32 = 200;

#[derive(Clone, Copy, Debug)]
pub struct GhostSpec {
    pub color: GhostColor,
    pub home: Vec2,
    pub dir: Direction,
    pub mode: GhostMode,
    pub scatter_target: Vec2,
}

pub const GHOST_ROSTER: [GhostSpec; 4] = [
    GhostSpec {
        color: GhostColor::Red,
        home: Vec2 { x: 13, y: 14 },
        dir: Direction::Up,
        mode: GhostMode::Chase,
        scatter_target: Vec2 { x: 25, y: 1 },
    },
    GhostSpec {
        color: GhostColor::Pink,
        home: Vec2 { x: 14, y: 14 },
        dir: Direction::Up,
        mode: GhostMode::Chase,
        scatter_target: Vec2 { x: 2, y: 1 },
    },
    GhostSpec {
        color: GhostColor::Cyan,
        home: Vec2 { x: 13, y: 15 },
        dir: Direction::Down,
        mode: GhostMode::Chase,
        scatter_target: Vec2 { x: 27, y: 29 },
    },
    GhostSpec {
        color: GhostColor::Orange,
        home: Vec2 { x: 14, y: 15 },
        dir: Direction::Down,
        mode: GhostMode::Chase,
        scatter_target: Vec2 { x: 0, y: 29 },
    },
];
