use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Direction, Position, Vec2};

pub fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

pub fn manhattan(a: Position, b: Position) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub fn manhattan_cells(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

pub fn offset(cell: Vec2, dir: Direction) -> Vec2 {
    let (dx, dy) = dir.delta();
    Vec2 {
        x: cell.x + dx,
        y: cell.y + dy,
    }
}
