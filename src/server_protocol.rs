use serde_json::Value;

use crate::types::{Direction, Intent};

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    Input { dir: Direction },
    Pause,
    Start,
    Restart,
    Key { intent: Intent },
    Ping { t: f64 },
}

impl ParsedClientMessage {
    pub fn into_intent(self) -> Option<Intent> {
        match self {
            Self::Input { dir } => Some(Intent::SetIntendedHeading(dir)),
            Self::Pause => Some(Intent::TogglePause),
            Self::Start => Some(Intent::Start),
            Self::Restart => Some(Intent::Restart),
            Self::Key { intent } => Some(intent),
            Self::Ping { .. } => None,
        }
    }
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "input" => {
            let dir = Direction::parse_move(object.get("dir")?.as_str()?)?;
            Some(ParsedClientMessage::Input { dir })
        }
        "pause" => Some(ParsedClientMessage::Pause),
        "start" => Some(ParsedClientMessage::Start),
        "restart" => Some(ParsedClientMessage::Restart),
        "key" => {
            let intent = parse_key(object.get("key")?.as_str()?)?;
            Some(ParsedClientMessage::Key { intent })
        }
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

pub fn parse_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowUp" => Some(Intent::SetIntendedHeading(Direction::Up)),
        "ArrowDown" => Some(Intent::SetIntendedHeading(Direction::Down)),
        "ArrowLeft" => Some(Intent::SetIntendedHeading(Direction::Left)),
        "ArrowRight" => Some(Intent::SetIntendedHeading(Direction::Right)),
        " " | "Space" => Some(Intent::StartOrPause),
        "Enter" => Some(Intent::Start),
        "r" | "R" => Some(Intent::Restart),
        _ => None,
    }
}
