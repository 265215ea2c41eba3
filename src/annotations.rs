use serde::Deserialize;

use crate::direction::CourtSide;
use crate::raw_feed::{RawGame, RawMoment};

pub const MSG_MADE_SHOT: i32 = 1;
pub const MSG_MISSED_SHOT: i32 = 2;
pub const MSG_TURNOVER: i32 = 5;
pub const MSG_FOUL: i32 = 6;

const KEPT_MSG_TYPES: [i32; 4] = [MSG_MADE_SHOT, MSG_MISSED_SHOT, MSG_TURNOVER, MSG_FOUL];

// Possession never actually changes hands on these, so the tracking window
// carries no half-court action worth mining.
const EXCLUDED_DESCRIPTIONS: [&str; 4] = ["Offensive Charge", "OFF.FOUL", "T.FOUL", "L.B.FOUL"];

/// One play-by-play row as handed over by the annotation loader. Field
/// names mirror the upstream export columns.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationRow {
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
    #[serde(rename = "EVENTNUM")]
    pub event_num: i64,
    #[serde(rename = "EVENTMSGTYPE")]
    pub msg_type: i32,
    #[serde(rename = "PERIOD")]
    pub period: i32,
    #[serde(rename = "PCTIMESTRING")]
    pub clock: String,
    #[serde(rename = "HOMEDESCRIPTION", default)]
    pub home_description: Option<String>,
    #[serde(rename = "VISITORDESCRIPTION", default)]
    pub visitor_description: Option<String>,
    #[serde(rename = "PLAYER1_ID", default)]
    pub player1_id: Option<i64>,
    #[serde(rename = "PLAYER1_TEAM_ID", default)]
    pub player1_team_id: Option<i64>,
    #[serde(rename = "PLAYER2_ID", default)]
    pub player2_id: Option<i64>,
    #[serde(rename = "PLAYER2_TEAM_ID", default)]
    pub player2_team_id: Option<i64>,
    #[serde(rename = "PLAYER3_ID", default)]
    pub player3_id: Option<i64>,
}

impl AnnotationRow {
    pub fn event_id(&self) -> String {
        event_id(&self.game_id, self.event_num)
    }

    fn description_matches(&self, needle: &str) -> bool {
        self.home_description
            .as_deref()
            .is_some_and(|d| d.contains(needle))
            || self
                .visitor_description
                .as_deref()
                .is_some_and(|d| d.contains(needle))
    }
}

pub fn event_id(game_id: &str, event_num: i64) -> String {
    format!("{game_id}-{event_num:03}")
}

/// Keep only make/miss/turnover/foul rows, minus the foul flavors that
/// carry no possession and minus manually flagged bad events.
pub fn trim_annotation_rows(rows: &[AnnotationRow], bad_events: &[i64]) -> Vec<AnnotationRow> {
    rows.iter()
        .filter(|row| KEPT_MSG_TYPES.contains(&row.msg_type))
        .filter(|row| {
            !EXCLUDED_DESCRIPTIONS
                .iter()
                .any(|needle| row.description_matches(needle))
        })
        .filter(|row| !bad_events.contains(&row.event_num))
        .cloned()
        .collect()
}

/// A play-by-play event merged with its tracking window. Immutable after
/// the merge stage except for the overlap extension below.
#[derive(Debug, Clone)]
pub struct GameEvent {
    pub event_id: String,
    pub event_num: i64,
    pub msg_type: i32,
    pub period: i32,
    pub clock: String,
    pub possession_team: i64,
    pub direction: Option<CourtSide>,
    pub moments: Vec<RawMoment>,
}

/// Inner-join annotation rows with the tracking events by event number.
/// Rows without a tracking window are dropped, as are tracking events the
/// annotations never mention.
pub fn merge_tracking(
    rows: &[AnnotationRow],
    possessions: &[i64],
    game: &RawGame,
) -> Vec<GameEvent> {
    debug_assert_eq!(rows.len(), possessions.len());
    let mut events = Vec::new();
    for (row, &possession_team) in rows.iter().zip(possessions) {
        let Some(tracked) = game
            .events
            .iter()
            .find(|e| e.event_id.trim().parse::<i64>() == Ok(row.event_num))
        else {
            continue;
        };
        events.push(GameEvent {
            event_id: row.event_id(),
            event_num: row.event_num,
            msg_type: row.msg_type,
            period: row.period,
            clock: row.clock.clone(),
            possession_team,
            direction: None,
            moments: tracked.moments.clone(),
        });
    }
    events
}

/// Append each event's predecessor moments to its own window. Annotated
/// plays frequently start mid-action; the wider window recovers hand-offs
/// near the boundary, at the cost of the duplicate detections that
/// candidate dedup later removes.
pub fn extend_event_moments(events: &mut [GameEvent]) {
    for index in (1..events.len()).rev() {
        let previous = events[index - 1].moments.clone();
        events[index].moments.extend(previous);
    }
}

/// `"7:32"` -> seconds remaining in the period.
pub fn clock_to_seconds(timestamp: &str) -> Option<i64> {
    let (minutes, seconds) = timestamp.trim().split_once(':')?;
    let minutes = minutes.trim().parse::<i64>().ok()?;
    let seconds = seconds.trim().parse::<i64>().ok()?;
    Some(minutes * 60 + seconds)
}

/// Float clock -> the unpadded `"M:S"` rendering the labeled dataset uses.
/// Candidate dedup compares these strings, so the format is load-bearing.
pub fn seconds_to_clock(game_clock: f64) -> String {
    let minutes = (game_clock / 60.0) as i64;
    let seconds = (game_clock % 60.0) as i64;
    format!("{minutes}:{seconds}")
}
