use std::collections::HashMap;

use serde::Serialize;

use crate::annotations::{GameEvent, seconds_to_clock};
use crate::court::{in_paint, on_baseline};
use crate::error::EngineError;
use crate::game_config::GameConfig;
use crate::moments::{Frame, frame_at};
use crate::passes::Pass;
use crate::raw_feed::PlayerInfo;

pub const CLASSIFICATION_TYPE: &str = "dribble-hand-off";

/// Two detections of the same action from overlapping event windows sit
/// next to each other in the game-ordered list; this is how far apart they
/// can land and still be recognized as one.
const DEDUP_WINDOW: usize = 5;

/// A pass promoted to a dribble-hand-off instance, pending human review.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub event_id: String,
    pub classification_type: &'static str,
    pub manual_label: Option<bool>,
    pub period: i32,
    pub game_clock: String,
    pub shot_clock: f64,
    pub player_a_id: i64,
    pub player_a_name: String,
    pub player_b_id: i64,
    pub player_b_name: String,
}

/// True when the ball sits inside either key at the start or end of the
/// pass. Post-ups and interior kick-outs live there, not hand-offs. A pass
/// frame with no ball sample also lands here: an unverifiable pass is
/// rejected rather than promoted.
pub fn check_for_paint_pass(frames: &[Frame], pass: &Pass) -> bool {
    for frame_index in [pass.pass_frame, pass.receive_frame] {
        match frame_at(frames, frame_index) {
            Some(frame) => {
                if in_paint(frame.ball.x, frame.ball.y) {
                    return true;
                }
            }
            None => return true,
        }
    }
    false
}

/// True when the ball starts on a baseline inbound strip.
pub fn check_for_inbound_pass(frames: &[Frame], pass: &Pass) -> bool {
    match frame_at(frames, pass.pass_frame) {
        Some(frame) => on_baseline(frame.ball.x, frame.ball.y),
        None => true,
    }
}

/// Apply the per-game event numbering correction to an `{game}-{num}` id.
pub fn shift_event_id(event_id: &str, offset: i64) -> String {
    if offset == 0 {
        return event_id.to_string();
    }
    let Some((game_id, num)) = event_id.rsplit_once('-') else {
        return event_id.to_string();
    };
    match num.parse::<i64>() {
        Ok(num) => format!("{game_id}-{:03}", num + offset),
        Err(_) => event_id.to_string(),
    }
}

/// Promote short, non-paint, non-inbound passes to candidates.
pub fn collect_candidates(
    event: &GameEvent,
    frames: &[Frame],
    passes: &[Pass],
    players: &HashMap<i64, &PlayerInfo>,
    config: &GameConfig,
) -> Result<Vec<Candidate>, EngineError> {
    let event_id = shift_event_id(&event.event_id, config.event_offset);
    let mut candidates = Vec::new();
    let mut ordinal = 0usize;

    for pass in passes {
        if check_for_paint_pass(frames, pass)
            || check_for_inbound_pass(frames, pass)
            || pass.pass_frame + config.moment_range < pass.receive_frame
        {
            continue;
        }

        let frame = frame_at(frames, pass.pass_frame)
            .ok_or_else(|| EngineError::malformed(&event.event_id, "pass frame out of range"))?;
        if frame.player(pass.passer_id).is_none() {
            return Err(EngineError::malformed(
                &event.event_id,
                format!("passer {} absent at pass frame", pass.passer_id),
            ));
        }

        ordinal += 1;
        candidates.push(Candidate {
            candidate_id: format!("{event_id}-{ordinal}"),
            event_id: event_id.clone(),
            classification_type: CLASSIFICATION_TYPE,
            manual_label: None,
            period: event.period,
            game_clock: seconds_to_clock(frame.game_clock),
            shot_clock: frame.shot_clock,
            player_a_id: pass.passer_id,
            player_a_name: player_name(players, &event.event_id, pass.passer_id)?,
            player_b_id: pass.receiver_id,
            player_b_name: player_name(players, &event.event_id, pass.receiver_id)?,
        });
    }
    Ok(candidates)
}

fn player_name(
    players: &HashMap<i64, &PlayerInfo>,
    event_id: &str,
    player_id: i64,
) -> Result<String, EngineError> {
    players
        .get(&player_id)
        .map(|p| p.name.clone())
        .ok_or_else(|| {
            EngineError::malformed(event_id, format!("player {player_id} missing from roster"))
        })
}

/// Drop candidates whose (period, game clock, shot clock) triple reappears
/// within the next few entries of the game-ordered list; the later
/// detection survives. Running this on an already-deduplicated list is a
/// no-op.
pub fn remove_duplicate_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept = Vec::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        let window_end = (index + DEDUP_WINDOW).min(candidates.len());
        let duplicate = candidates[index + 1..window_end].iter().any(|other| {
            other.period == candidate.period
                && other.game_clock == candidate.game_clock
                && other.shot_clock == candidate.shot_clock
        });
        if !duplicate {
            kept.push(candidate.clone());
        }
    }
    kept
}
