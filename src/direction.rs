use serde::{Deserialize, Serialize};

use crate::annotations::{GameEvent, MSG_MADE_SHOT, clock_to_seconds};
use crate::court::HALF_COURT_X;
use crate::error::EngineError;
use crate::raw_feed::BALL_ID;

const CLOCK_MATCH_TOLERANCE: f64 = 1.0;

/// Which basket a team is attacking during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourtSide {
    Left,
    Right,
}

impl CourtSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Calibrate court direction off the first made field goal of the first
/// half, then stamp every event. Teams swap baskets at halftime, so
/// periods 3+ invert the first-half mapping.
///
/// Failing to find an anchor is fatal for the whole game: nothing
/// downstream can be trusted without a direction.
pub fn assign_directions(events: &mut [GameEvent]) -> Result<(), EngineError> {
    let (anchor_team, anchor_side) = find_anchor(events)?;
    for event in events.iter_mut() {
        let same_team = event.possession_team == anchor_team;
        let first_half = event.period < 3;
        let side = if same_team == first_half {
            anchor_side
        } else {
            anchor_side.opposite()
        };
        event.direction = Some(side);
    }
    Ok(())
}

/// The anchor is the scoring team of the first first-half make, read at
/// the moment nearest the recorded clock time. The frames carry no clock
/// index, so this is a nearest-match scan with a one second tolerance.
fn find_anchor(events: &[GameEvent]) -> Result<(i64, CourtSide), EngineError> {
    for event in events {
        if event.msg_type != MSG_MADE_SHOT || event.period >= 3 {
            continue;
        }
        let Some(event_time) = clock_to_seconds(&event.clock) else {
            continue;
        };
        let event_time = event_time as f64;
        for moment in &event.moments {
            if moment.game_clock > event_time + CLOCK_MATCH_TOLERANCE
                || moment.game_clock < event_time - CLOCK_MATCH_TOLERANCE
            {
                continue;
            }
            let Some(ball) = moment.rows.iter().find(|r| r.player_id == BALL_ID) else {
                continue;
            };
            let side = if ball.x >= HALF_COURT_X {
                CourtSide::Right
            } else {
                CourtSide::Left
            };
            return Ok((event.possession_team, side));
        }
    }
    Err(EngineError::MissingAnchor)
}
