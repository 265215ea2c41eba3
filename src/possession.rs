use std::collections::HashMap;

use crate::annotations::{AnnotationRow, MSG_FOUL, MSG_MADE_SHOT, MSG_MISSED_SHOT, MSG_TURNOVER};
use crate::error::EngineError;
use crate::raw_feed::TeamInfo;

const SHOT_CLOCK_TURNOVER: &str = "Turnover: Shot Clock";
const DEF_THREE_SECONDS: &str = "Def. 3 Sec";
const TECHNICAL_FOUL: &str = "T.Foul";

/// Assign the possessing team for one annotation row.
///
/// Shots credit the shooter's team. A shot-clock turnover is resolved
/// through the player->team map because the row's team field is unreliable
/// for that code. A defensive-3-seconds violation flips to the team not
/// named on the call. Fouls credit the fouled player's team. Blank team
/// ids fall back to the player->team lookup.
pub fn resolve(
    row: &AnnotationRow,
    home: TeamInfo,
    visitor: TeamInfo,
    player_teams: &HashMap<i64, i64>,
) -> Result<i64, EngineError> {
    if description_contains(row, DEF_THREE_SECONDS) {
        let named = team_of(row.player1_team_id, row.player1_id, player_teams);
        return match named {
            Some(team) if team == home.team_id => Ok(visitor.team_id),
            Some(_) => Ok(home.team_id),
            None => Err(unresolved(row, "no team named on defensive 3 seconds")),
        };
    }

    match row.msg_type {
        MSG_MADE_SHOT | MSG_MISSED_SHOT => {
            team_of(row.player1_team_id, row.player1_id, player_teams)
                .ok_or_else(|| unresolved(row, "shooter team unknown"))
        }
        MSG_TURNOVER => {
            if description_contains(row, SHOT_CLOCK_TURNOVER) {
                return row
                    .player1_id
                    .and_then(|id| player_teams.get(&id).copied())
                    .ok_or_else(|| unresolved(row, "shot clock turnover player unknown"));
            }
            team_of(row.player1_team_id, row.player1_id, player_teams)
                .ok_or_else(|| unresolved(row, "turnover team unknown"))
        }
        MSG_FOUL => {
            if description_contains(row, TECHNICAL_FOUL) {
                return team_of(row.player1_team_id, row.player1_id, player_teams)
                    .ok_or_else(|| unresolved(row, "technical foul team unknown"));
            }
            team_of(row.player2_team_id, row.player2_id, player_teams)
                .ok_or_else(|| unresolved(row, "fouled player team unknown"))
        }
        other => Err(unresolved(row, format!("unsupported message type {other}"))),
    }
}

fn team_of(
    team_id: Option<i64>,
    player_id: Option<i64>,
    player_teams: &HashMap<i64, i64>,
) -> Option<i64> {
    team_id.or_else(|| player_id.and_then(|id| player_teams.get(&id).copied()))
}

fn description_contains(row: &AnnotationRow, needle: &str) -> bool {
    row.home_description
        .as_deref()
        .is_some_and(|d| d.contains(needle))
        || row
            .visitor_description
            .as_deref()
            .is_some_and(|d| d.contains(needle))
}

fn unresolved(row: &AnnotationRow, reason: impl Into<String>) -> EngineError {
    EngineError::Resolution {
        event_num: row.event_num,
        reason: reason.into(),
    }
}
