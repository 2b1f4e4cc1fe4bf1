use crate::maze::Maze;
use crate::types::{Direction, Position};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionOutcome {
    pub position: Position,
    pub dir: Direction,
    pub moved: bool,
}

pub fn try_advance(maze: &Maze, position: Position, dir: Direction, distance: f64) -> Option<Position> {
    if dir == Direction::None {
        return None;
    }
    let candidate = position.offset(dir, distance);
    if maze.is_passable_wrapped(candidate.cell()) {
        Some(candidate)
    } else {
        None
    }
}

pub fn wrap_horizontal(maze: &Maze, mut position: Position) -> Position {
    let width = maze.width() as f64;
    if position.x < 0.0 {
        position.x = width - 1.0;
    }
    if position.x >= width {
        position.x = 0.0;
    }
    position
}

pub fn resolve_intent(
    maze: &Maze,
    position: Position,
    current: Direction,
    buffered: Direction,
    speed: f64,
) -> MotionOutcome {
    let mut dir = current;
    if try_advance(maze, position, buffered, speed).is_some() {
        dir = buffered;
    }

    match try_advance(maze, position, dir, speed) {
        Some(next) => MotionOutcome {
            position: wrap_horizontal(maze, next),
            dir,
            moved: true,
        },
        None => MotionOutcome {
            position,
            dir,
            moved: false,
        },
    }
}
