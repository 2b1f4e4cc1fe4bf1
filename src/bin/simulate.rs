use clap::Parser;
use packman_classic::autopilot::Autopilot;
use packman_classic::constants::{FRAME_MS, GHOST_ROSTER, PLAYER_START};
use packman_classic::engine::ghost_policy::legal_headings;
use packman_classic::engine::utils::now_ms;
use packman_classic::engine::Session;
use packman_classic::logging::{Level, LogLine};
use packman_classic::score_store::MemoryScoreStore;
use packman_classic::types::{
    Direction, GameSummary, Intent, RuntimeEvent, SessionState, Snapshot, Vec2,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Headless autopilot runs that re-check the game invariants every tick.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 3)]
    runs: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = FRAME_MS)]
    frame_ms: u64,
    /// Simulated time budget per run.
    #[arg(long, default_value_t = 600_000)]
    max_ms: u64,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct RunConfig {
    run: usize,
    seed: u32,
    frame_ms: u64,
    max_ms: u64,
    starting_high_score: u32,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: usize,
    seed: u32,
    outcome: String,
    score: u32,
    #[serde(rename = "highScore")]
    high_score: u32,
    collected: u32,
    #[serde(rename = "totalCollectible")]
    total_collectible: u32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: f64,
    ticks: u64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RunOutcome {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug)]
struct TickMemory {
    score: u32,
    max_score: u32,
    ghosts: Vec<(Vec2, Direction)>,
}

#[derive(Debug, Default)]
struct AnomalyLog {
    messages: Vec<String>,
    records: Vec<AnomalyRecord>,
    seen: HashSet<String>,
}

impl AnomalyLog {
    fn push(&mut self, tick: u64, message: String) {
        self.records.push(AnomalyRecord {
            tick,
            message: message.clone(),
        });
        if self.seen.insert(message.clone()) {
            self.messages.push(message);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let base_seed = cli.seed.unwrap_or_else(now_ms) as u32;
    let started_at_ms = now_ms();
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(base_seed, started_at_ms));
    let frame_ms = cli.frame_ms.max(1);

    let mut has_anomaly = false;
    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;
    let mut high_score = 0u32;

    for run in 0..cli.runs.max(1) {
        let config = RunConfig {
            run,
            seed: base_seed.wrapping_add(run as u32),
            frame_ms,
            max_ms: cli.max_ms,
            starting_high_score: high_score,
        };
        LogLine::new(
            Level::Info,
            "run_started",
            json!({
                "frameMs": config.frame_ms,
                "maxMs": config.max_ms,
                "startingHighScore": config.starting_high_score,
            }),
        )
        .match_id(&match_id)
        .run(run, config.seed)
        .emit();

        let outcome = match run_session(&config) {
            Ok(outcome) => outcome,
            Err(error) => {
                LogLine::new(
                    Level::Error,
                    "maze_load_failed",
                    json!({ "error": error.to_string() }),
                )
                .match_id(&match_id)
                .run(run, config.seed)
                .emit();
                std::process::exit(1);
            }
        };

        for anomaly in &outcome.anomaly_records {
            LogLine::new(
                Level::Warn,
                "anomaly_detected",
                json!({ "message": anomaly.message }),
            )
            .match_id(&match_id)
            .run(run, config.seed)
            .tick(anomaly.tick)
            .emit();
        }

        if !outcome.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += outcome.anomaly_records.len();
        high_score = high_score.max(outcome.result.high_score);
        *outcome_counts
            .entry(outcome.result.outcome.clone())
            .or_insert(0) += 1;

        LogLine::new(
            Level::Info,
            "run_finished",
            json!({
                "outcome": outcome.result.outcome,
                "score": outcome.result.score,
                "collected": outcome.result.collected,
                "totalCollectible": outcome.result.total_collectible,
                "anomalyCount": outcome.anomaly_records.len(),
            }),
        )
        .match_id(&match_id)
        .run(run, config.seed)
        .tick(outcome.result.ticks)
        .emit();

        match serde_json::to_string(&outcome.result) {
            Ok(line) => println!("{line}"),
            Err(error) => LogLine::new(
                Level::Error,
                "run_result_serialize_failed",
                json!({ "error": error.to_string() }),
            )
            .match_id(&match_id)
            .emit(),
        }
        results.push(outcome.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at_ms,
        now_ms(),
        results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            LogLine::new(
                Level::Error,
                "summary_write_failed",
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            )
            .match_id(&match_id)
            .emit();
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    LogLine::new(
        Level::Info,
        "simulation_finished",
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    )
    .match_id(&match_id)
    .emit();

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_session(config: &RunConfig) -> Result<RunOutcome, packman_classic::maze::MazeError> {
    let store = MemoryScoreStore::new(config.starting_high_score);
    let mut session = Session::new(Box::new(store))?;
    let mut autopilot = Autopilot::new(config.seed);
    let mut anomalies = AnomalyLog::default();

    session.push_intent(Intent::Start);
    session.update(0.0);
    let opening = session.build_snapshot(true);
    let mut memory = TickMemory {
        score: opening.score,
        max_score: config.starting_high_score,
        ghosts: ghost_cells(&opening),
    };

    let dt_ms = config.frame_ms as f64;
    let mut now = 0.0;
    let mut counts = EventCounts::default();
    let mut timed_out = false;

    while session.state() == SessionState::Playing {
        if let Some(intent) = autopilot.decide(&session, now) {
            session.push_intent(intent);
        }
        session.update(dt_ms);
        now += dt_ms;

        let snapshot = session.build_snapshot(true);
        counts.absorb(&snapshot.events);
        for message in collect_snapshot_anomalies(&session, &snapshot, &memory) {
            anomalies.push(snapshot.tick, message);
        }
        memory = TickMemory {
            score: snapshot.score,
            max_score: memory.max_score.max(snapshot.score),
            ghosts: ghost_cells(&snapshot),
        };

        if now >= config.max_ms as f64 {
            timed_out = session.state() == SessionState::Playing;
            break;
        }
    }

    let summary = session.build_summary();
    Ok(RunOutcome {
        result: build_result_line(config, &summary, &counts, timed_out, anomalies.messages),
        anomaly_records: anomalies.records,
    })
}

#[derive(Clone, Debug, Default)]
struct EventCounts {
    pellets: u32,
    power_pellets: u32,
}

impl EventCounts {
    fn absorb(&mut self, events: &[RuntimeEvent]) {
        for event in events {
            match event {
                RuntimeEvent::PelletEaten { .. } => self.pellets += 1,
                RuntimeEvent::PowerPelletEaten { .. } => self.power_pellets += 1,
                _ => {}
            }
        }
    }
}

fn ghost_cells(snapshot: &Snapshot) -> Vec<(Vec2, Direction)> {
    snapshot
        .ghosts
        .iter()
        .map(|ghost| (Vec2 { x: ghost.x, y: ghost.y }, ghost.dir))
        .collect()
}

fn collect_snapshot_anomalies(
    session: &Session,
    snapshot: &Snapshot,
    previous: &TickMemory,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let maze = session.maze();

    if !snapshot.power.active && snapshot.ghosts.iter().any(|ghost| ghost.vulnerable) {
        anomalies.push("vulnerable ghost without active power".to_string());
    }
    if snapshot.score < previous.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.score, snapshot.score
        ));
    }
    let expected_high = previous.max_score.max(snapshot.score);
    if snapshot.high_score != expected_high {
        anomalies.push(format!(
            "high score {} != max score {}",
            snapshot.high_score, expected_high
        ));
    }
    if snapshot.collected > snapshot.total_collectible {
        anomalies.push(format!(
            "collected {} exceeds total {}",
            snapshot.collected, snapshot.total_collectible
        ));
    }
    if snapshot.lives < 0 {
        anomalies.push(format!("negative lives: {}", snapshot.lives));
    }

    let player_cell = maze.wrap_cell(session.player_position().cell());
    if !maze.is_passable(player_cell) {
        anomalies.push(format!(
            "player inside wall at ({}, {})",
            player_cell.x, player_cell.y
        ));
    }

    for (ghost, (prev_cell, prev_dir)) in snapshot.ghosts.iter().zip(&previous.ghosts) {
        let cell = Vec2 {
            x: ghost.x,
            y: ghost.y,
        };
        if !maze.is_passable(cell) {
            anomalies.push(format!("ghost {} inside wall", ghost.id));
        }
        if ghost.dir == prev_dir.opposite()
            && !legal_headings(maze, *prev_cell, *prev_dir).is_empty()
        {
            anomalies.push(format!("ghost {} reversed with other options open", ghost.id));
        }
    }

    let life_lost = snapshot
        .events
        .iter()
        .any(|event| matches!(event, RuntimeEvent::LifeLost { .. }));
    if life_lost && snapshot.state == SessionState::Playing {
        if player_cell != PLAYER_START {
            anomalies.push("player not back at start after life loss".to_string());
        }
        for (ghost, spec) in snapshot.ghosts.iter().zip(GHOST_ROSTER.iter()) {
            if (Vec2 {
                x: ghost.x,
                y: ghost.y,
            }) != spec.home
            {
                anomalies.push(format!("ghost {} not home after life loss", ghost.id));
            }
        }
    }

    if snapshot.state == SessionState::Win && snapshot.collected < snapshot.total_collectible {
        anomalies.push("win before the ledger was cleared".to_string());
    }
    anomalies
}

fn build_result_line(
    config: &RunConfig,
    summary: &GameSummary,
    counts: &EventCounts,
    timed_out: bool,
    anomalies: Vec<String>,
) -> RunResultLine {
    RunResultLine {
        run: config.run,
        seed: config.seed,
        outcome: outcome_key(summary.state, timed_out),
        score: summary.score,
        high_score: summary.high_score,
        collected: summary.collected,
        total_collectible: summary.total_collectible,
        pellets_eaten: counts.pellets,
        power_pellets_eaten: counts.power_pellets,
        ghosts_eaten: summary.ghosts_eaten,
        lives_lost: summary.lives_lost,
        elapsed_ms: summary.elapsed_ms,
        ticks: summary.ticks,
        anomalies,
    }
}

fn outcome_key(state: SessionState, timed_out: bool) -> String {
    if timed_out {
        return "timeout".to_string();
    }
    match state {
        SessionState::Win => "win",
        SessionState::GameOver => "game_over",
        SessionState::Start => "start",
        SessionState::Playing => "playing",
        SessionState::Paused => "paused",
    }
    .to_string()
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    runs: Vec<RunResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let total_score: u64 = runs.iter().map(|run| run.score as u64).sum();
    let average_score = if run_count == 0 {
        0
    } else {
        (total_score / run_count as u64) as u32
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        run_count,
        anomaly_count,
        average_score,
        outcome_counts,
        runs,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
