use serde::Serialize;

/// Heading of an agent. `None` is the idle zero vector, only valid for the
/// player before its first accepted turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Candidate enumeration order; ties in the adversary heuristic resolve to
    /// the earliest entry.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Pellet,
    PowerPellet,
    Empty,
}

impl CellKind {
    pub fn is_collectible(self) -> bool {
        matches!(self, Self::Pellet | Self::PowerPellet)
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Pellet => '.',
            Self::PowerPellet => 'o',
            Self::Empty => ' ',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(Self::Wall),
            '.' => Some(Self::Pellet),
            'o' => Some(Self::PowerPellet),
            ' ' => Some(Self::Empty),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn to_position(self) -> Position {
        Position {
            x: self.x as f64,
            y: self.y as f64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Nearest cell, rounding halves upward (`-0.5` lands on `0`).
    pub fn cell(self) -> Vec2 {
        Vec2 {
            x: (self.x + 0.5).floor() as i32,
            y: (self.y + 0.5).floor() as i32,
        }
    }

    pub fn offset(self, dir: Direction, distance: f64) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx as f64 * distance,
            y: self.y + dy as f64 * distance,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Start,
    Playing,
    Paused,
    GameOver,
    Win,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Win)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostColor {
    Red,
    Pink,
    Cyan,
    Orange,
}

impl GhostColor {
    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#FF0000",
            Self::Pink => "#FFB8FF",
            Self::Cyan => "#00FFFF",
            Self::Orange => "#FFB851",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    SetIntendedHeading(Direction),
    TogglePause,
    /// Space bar: begins a run from the title state, otherwise pauses.
    StartOrPause,
    Start,
    Restart,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f64,
    pub y: f64,
    pub dir: Direction,
    #[serde(rename = "nextDir")]
    pub next_dir: Direction,
    #[serde(rename = "mouthOpen")]
    pub mouth_open: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub color: GhostColor,
    #[serde(rename = "colorHex")]
    pub color_hex: &'static str,
    pub mode: GhostMode,
    pub vulnerable: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PowerView {
    pub active: bool,
    #[serde(rename = "remainingMs")]
    pub remaining_ms: f64,
    pub ending: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        x: i32,
        y: i32,
    },
    PowerPelletEaten {
        x: i32,
        y: i32,
    },
    PowerModeStarted,
    PowerModeEnded,
    GhostEaten {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        color: GhostColor,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    HighScoreUpdated {
        score: u32,
    },
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: f64,
    pub state: SessionState,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub lives: i32,
    pub collected: u32,
    #[serde(rename = "totalCollectible")]
    pub total_collectible: u32,
    pub power: PowerView,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub tiles: Vec<String>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub state: SessionState,
    pub score: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    pub lives: i32,
    pub collected: u32,
    #[serde(rename = "totalCollectible")]
    pub total_collectible: u32,
    #[serde(rename = "ghostsEaten")]
    pub ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    pub lives_lost: u32,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: f64,
    pub ticks: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct HighScoreResponse {
    #[serde(rename = "highScore")]
    pub high_score: u32,
    #[serde(rename = "generatedAtIso")]
    pub generated_at_iso: String,
}
