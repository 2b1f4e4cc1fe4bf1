use std::collections::{HashSet, VecDeque};

use crate::engine::utils::{manhattan_cells, offset};
use crate::engine::Session;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, Intent, Vec2};

const DANGER_RADIUS: i32 = 3;
const HUNT_RADIUS: i32 = 6;

#[derive(Clone, Debug)]
pub struct Autopilot {
    rng: Rng,
    think_at_ms: f64,
}

impl Autopilot {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed),
            think_at_ms: 0.0,
        }
    }

    pub fn decide(&mut self, session: &Session, now_ms: f64) -> Option<Intent> {
        if now_ms < self.think_at_ms {
            return None;
        }
        self.think_at_ms = now_ms + self.rng.int(90, 190) as f64;

        let maze = session.maze();
        let cell = maze.wrap_cell(session.player_position().cell());
        let power_active = session.power().is_active();

        let threats: Vec<Vec2> = session
            .ghosts()
            .filter(|ghost| !(ghost.vulnerable && power_active))
            .map(|ghost| Vec2 { x: ghost.x, y: ghost.y })
            .collect();
        let prey: Vec<Vec2> = session
            .ghosts()
            .filter(|ghost| ghost.vulnerable && power_active)
            .map(|ghost| Vec2 { x: ghost.x, y: ghost.y })
            .collect();

        let heading = match nearest(cell, &threats) {
            Some(dist) if dist <= DANGER_RADIUS => self.escape_heading(maze, cell, &threats),
            _ => match closest_target(cell, &prey) {
                Some(target) if manhattan_cells(cell, target) <= HUNT_RADIUS => {
                    first_step_towards(maze, cell, |candidate| candidate == target)
                        .unwrap_or_else(|| self.random_heading(maze, cell))
                }
                _ => first_step_towards(maze, cell, |candidate| {
                    maze.cell_kind_at(candidate).is_collectible()
                })
                .unwrap_or_else(|| self.random_heading(maze, cell)),
            },
        };

        if heading == Direction::None || heading == session.player().next_dir {
            return None;
        }
        Some(Intent::SetIntendedHeading(heading))
    }

    fn escape_heading(&mut self, maze: &Maze, cell: Vec2, threats: &[Vec2]) -> Direction {
        let mut best = Direction::None;
        let mut best_dist = i32::MIN;
        for dir in open_headings(maze, cell) {
            let next = maze.wrap_cell(offset(cell, dir));
            let dist = nearest(next, threats).unwrap_or(99);
            if dist > best_dist {
                best_dist = dist;
                best = dir;
            }
        }
        if best == Direction::None {
            self.random_heading(maze, cell)
        } else {
            best
        }
    }

    fn random_heading(&mut self, maze: &Maze, cell: Vec2) -> Direction {
        self.rng
            .pick(&open_headings(maze, cell))
            .unwrap_or(Direction::None)
    }
}

fn open_headings(maze: &Maze, cell: Vec2) -> Vec<Direction> {
    Direction::CARDINALS
        .into_iter()
        .filter(|dir| maze.is_passable_wrapped(offset(cell, *dir)))
        .collect()
}

fn nearest(cell: Vec2, others: &[Vec2]) -> Option<i32> {
    others
        .iter()
        .map(|other| manhattan_cells(cell, *other))
        .min()
}

fn closest_target(cell: Vec2, others: &[Vec2]) -> Option<Vec2> {
    others
        .iter()
        .copied()
        .min_by_key(|other| manhattan_cells(cell, *other))
}

fn first_step_towards<F>(maze: &Maze, start: Vec2, goal: F) -> Option<Direction>
where
    F: Fn(Vec2) -> bool,
{
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::new();
    for dir in open_headings(maze, start) {
        let next = maze.wrap_cell(offset(start, dir));
        if seen.insert(next) {
            queue.push_back((next, dir));
        }
    }

    while let Some((cell, first)) = queue.pop_front() {
        if goal(cell) {
            return Some(first);
        }
        for dir in open_headings(maze, cell) {
            let next = maze.wrap_cell(offset(cell, dir));
            if seen.insert(next) {
                queue.push_back((next, first));
            }
        }
    }
    None
}
