use crate::engine::utils::{manhattan, offset};
use crate::maze::Maze;
use crate::types::{Direction, GhostMode, Position, Vec2};

#[derive(Clone, Copy, Debug)]
pub struct PolicyInput {
    pub cell: Vec2,
    pub dir: Direction,
    pub mode: GhostMode,
    pub scatter_target: Vec2,
    pub fleeing: bool,
}

pub fn legal_headings(maze: &Maze, cell: Vec2, dir: Direction) -> Vec<Direction> {
    let reverse = dir.opposite();
    Direction::CARDINALS
        .into_iter()
        .filter(|candidate| *candidate != reverse)
        .filter(|candidate| maze.is_passable_wrapped(offset(cell, *candidate)))
        .collect()
}

/// Ties keep the earliest candidate; with none legal the heading is held.
pub fn choose_heading(maze: &Maze, input: &PolicyInput, player: Position) -> Direction {
    let candidates = legal_headings(maze, input.cell, input.dir);
    if candidates.is_empty() {
        return input.dir;
    }

    let target = match input.mode {
        _ if input.fleeing => player,
        GhostMode::Chase => player,
        GhostMode::Scatter => input.scatter_target.to_position(),
    };

    let mut best = candidates[0];
    let mut best_dist = manhattan(offset(input.cell, best).to_position(), target);
    for candidate in candidates.into_iter().skip(1) {
        let dist = manhattan(offset(input.cell, candidate).to_position(), target);
        let better = if input.fleeing {
            dist > best_dist
        } else {
            dist < best_dist
        };
        if better {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

pub fn step_cell(maze: &Maze, cell: Vec2, dir: Direction) -> Vec2 {
    let next = offset(cell, dir);
    if !maze.is_passable_wrapped(next) {
        return cell;
    }
    maze.wrap_cell(next)
}
