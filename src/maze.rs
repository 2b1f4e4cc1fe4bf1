use thiserror::Error;

use crate::types::{CellKind, Vec2};

/// Reference maze. `#` wall, `.` pellet, `o` power pellet, ` ` empty
/// (ghost house and tunnel).
pub const REFERENCE_LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###  ### ##.######",
    "######.## #      # ##.######",
    "      .   #      #   .      ",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("maze layout has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { x: usize, y: usize, symbol: char },
}

#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<CellKind>,
}

impl Maze {
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MazeError> {
        let Some(first) = rows.first() else {
            return Err(MazeError::Empty);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MazeError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let kind =
                    CellKind::from_symbol(symbol).ok_or(MazeError::UnknownSymbol { x, y, symbol })?;
                cells.push(kind);
            }
        }

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
        })
    }

    pub fn reference() -> Result<Self, MazeError> {
        Self::parse(&REFERENCE_LAYOUT)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Vec2) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    fn index(&self, cell: Vec2) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some((cell.y * self.width + cell.x) as usize)
    }

    pub fn cell_kind_at(&self, cell: Vec2) -> CellKind {
        self.index(cell)
            .map(|idx| self.cells[idx])
            .unwrap_or(CellKind::Wall)
    }

    pub fn is_passable(&self, cell: Vec2) -> bool {
        self.cell_kind_at(cell) != CellKind::Wall
    }

    pub fn wrap_cell(&self, cell: Vec2) -> Vec2 {
        Vec2 {
            x: cell.x.rem_euclid(self.width),
            y: cell.y,
        }
    }

    pub fn is_passable_wrapped(&self, cell: Vec2) -> bool {
        self.is_passable(self.wrap_cell(cell))
    }

    pub fn consume(&mut self, cell: Vec2) -> CellKind {
        let Some(idx) = self.index(cell) else {
            return CellKind::Empty;
        };
        let prior = self.cells[idx];
        if !prior.is_collectible() {
            return CellKind::Empty;
        }
        self.cells[idx] = CellKind::Empty;
        prior
    }

    pub fn count_total_collectible(&self) -> u32 {
        self.cells
            .iter()
            .filter(|kind| **kind == CellKind::Pellet)
            .count() as u32
    }

    pub fn remaining_power_pellets(&self) -> u32 {
        self.cells
            .iter()
            .filter(|kind| **kind == CellKind::PowerPellet)
            .count() as u32
    }

    pub fn reset_collectibles(&mut self) {
        let width = self.width;
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            let idx = idx as i32;
            if let Some(kind) = restored_kind(idx % width, idx / width, *cell) {
                *cell = kind;
            }
        }
    }

    pub fn collectible_cells(&self) -> Vec<(Vec2, CellKind)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.is_collectible())
            .map(|(idx, kind)| {
                let idx = idx as i32;
                (
                    Vec2 {
                        x: idx % self.width,
                        y: idx / self.width,
                    },
                    *kind,
                )
            })
            .collect()
    }

    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|kind| kind.symbol()).collect())
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_cell(&mut self, cell: Vec2, kind: CellKind) {
        if let Some(idx) = self.index(cell) {
            self.cells[idx] = kind;
        }
    }
}

/// Restore rule of the classic board. No empty cell of the reference layout
/// satisfies it, so a reset refills nothing.
pub fn restored_kind(x: i32, y: i32, current: CellKind) -> Option<CellKind> {
    if current != CellKind::Empty {
        return None;
    }
    if !(6..=21).contains(&x) || !(9..=19).contains(&y) {
        return None;
    }
    if (x == 1 || x == 26) && (y == 3 || y == 23) {
        Some(CellKind::PowerPellet)
    } else if matches!(y, 1 | 5 | 20 | 26 | 29) {
        Some(CellKind::Pellet)
    } else {
        None
    }
}

/// Win bookkeeping. `total` is fixed when the maze is loaded; `collected`
/// counts every collectible eaten, power pellets included.
#[derive(Clone, Debug, Default)]
pub struct CollectibleLedger {
    pub total: u32,
    pub collected: u32,
}

impl CollectibleLedger {
    pub fn from_maze(maze: &Maze) -> Self {
        Self {
            total: maze.count_total_collectible(),
            collected: 0,
        }
    }

    pub fn record(&mut self) {
        self.collected += 1;
    }

    pub fn is_cleared(&self) -> bool {
        self.collected >= self.total
    }

    pub fn reset(&mut self) {
        self.collected = 0;
    }
}
