use serde::Serialize;
use serde_json::Value;

use crate::engine::utils::now_ms;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogLine {
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub level: Level,
    pub event: String,
    #[serde(rename = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

impl LogLine {
    pub fn new(level: Level, event: &str, details: Value) -> Self {
        Self {
            timestamp_ms: now_ms(),
            level,
            event: event.to_string(),
            match_id: None,
            run: None,
            seed: None,
            tick: None,
            details,
        }
    }

    pub fn match_id(mut self, match_id: &str) -> Self {
        self.match_id = Some(match_id.to_string());
        self
    }

    pub fn run(mut self, run: usize, seed: u32) -> Self {
        self.run = Some(run);
        self.seed = Some(seed);
        self
    }

    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    pub fn render(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|error| {
            format!(
                "{{\"level\":\"error\",\"event\":\"log_serialize_failed\",\"details\":{{\"error\":\"{error}\"}}}}"
            )
        })
    }

    pub fn emit(&self) {
        eprintln!("{}", self.render());
    }
}

pub fn info(event: &str, details: Value) {
    LogLine::new(Level::Info, event, details).emit();
}

pub fn warn(event: &str, details: Value) {
    LogLine::new(Level::Warn, event, details).emit();
}

pub fn error(event: &str, details: Value) {
    LogLine::new(Level::Error, event, details).emit();
}
