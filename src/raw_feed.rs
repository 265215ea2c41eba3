use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

/// Sentinel entity id carried by the ball in every SportVU moment row.
pub const BALL_ID: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
pub struct RawGame {
    #[serde(rename = "gameid")]
    pub game_id: String,
    #[serde(rename = "gamedate")]
    pub game_date: String,
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub home: RawTeam,
    pub visitor: RawTeam,
    pub moments: Vec<RawMoment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    #[serde(rename = "teamid")]
    pub team_id: i64,
    pub name: String,
    pub abbreviation: String,
    pub players: Vec<RawPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    #[serde(rename = "playerid")]
    pub player_id: i64,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub jersey: String,
    pub position: String,
}

/// One sampled instant of the tracking feed. The wire format is a
/// heterogeneous array `[period, wall_clock_ms, game_clock, shot_clock,
/// null, [[team_id, player_id, x, y, radius], ...]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMoment {
    pub period: i32,
    pub game_clock: f64,
    pub shot_clock: Option<f64>,
    pub rows: Vec<RawCoordinate>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawCoordinate {
    pub team_id: i64,
    pub player_id: i64,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl<'de> Deserialize<'de> for RawMoment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_moment(&value)
            .ok_or_else(|| serde::de::Error::custom("malformed SportVU moment tuple"))
    }
}

fn parse_moment(value: &Value) -> Option<RawMoment> {
    let parts = value.as_array()?;
    if parts.len() < 6 {
        return None;
    }
    let period = parts[0].as_i64()? as i32;
    let game_clock = as_f64_any(&parts[2])?;
    let shot_clock = as_f64_any(&parts[3]);

    let mut rows = Vec::new();
    for row in parts[5].as_array()? {
        rows.push(parse_coordinate(row)?);
    }
    Some(RawMoment {
        period,
        game_clock,
        shot_clock,
        rows,
    })
}

fn parse_coordinate(value: &Value) -> Option<RawCoordinate> {
    let parts = value.as_array()?;
    if parts.len() < 5 {
        return None;
    }
    Some(RawCoordinate {
        team_id: parts[0].as_i64()?,
        player_id: parts[1].as_i64()?,
        x: as_f64_any(&parts[2])?,
        y: as_f64_any(&parts[3])?,
        radius: as_f64_any(&parts[4])?,
    })
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

pub fn parse_raw_game(raw: &str) -> Result<RawGame> {
    serde_json::from_str::<RawGame>(raw.trim()).context("invalid SportVU game payload")
}

#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub player_id: i64,
    pub team_id: i64,
    pub name: String,
    pub jersey: String,
    pub position: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TeamInfo {
    pub team_id: i64,
}

impl RawGame {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m.%d.%Y", "%m/%d/%Y"];
        for fmt in FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(self.game_date.trim(), fmt) {
                return Some(date);
            }
        }
        None
    }

    /// Rosters come from the first event; SportVU repeats them on every
    /// event of the game.
    pub fn rosters(&self) -> (TeamInfo, TeamInfo, Vec<PlayerInfo>) {
        let Some(event) = self.events.first() else {
            return (
                TeamInfo { team_id: 0 },
                TeamInfo { team_id: 0 },
                Vec::new(),
            );
        };
        let mut players = Vec::new();
        for (team, roster) in [
            (event.home.team_id, &event.home.players),
            (event.visitor.team_id, &event.visitor.players),
        ] {
            for player in roster {
                players.push(PlayerInfo {
                    player_id: player.player_id,
                    team_id: team,
                    name: format!("{} {}", player.first_name, player.last_name),
                    jersey: player.jersey.clone(),
                    position: player.position.clone(),
                });
            }
        }
        (
            TeamInfo {
                team_id: event.home.team_id,
            },
            TeamInfo {
                team_id: event.visitor.team_id,
            },
            players,
        )
    }
}

pub fn player_lookup(players: &[PlayerInfo]) -> HashMap<i64, &PlayerInfo> {
    players.iter().map(|p| (p.player_id, p)).collect()
}

pub fn player_team_map(players: &[PlayerInfo]) -> HashMap<i64, i64> {
    players.iter().map(|p| (p.player_id, p.team_id)).collect()
}

pub fn possession_team_player_ids(players: &[PlayerInfo], possession_team: i64) -> Vec<i64> {
    players
        .iter()
        .filter(|p| p.team_id == possession_team)
        .map(|p| p.player_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_JSON: &str = r#"{
        "gameid": "0021500018",
        "gamedate": "2015-10-29",
        "events": [
            {
                "eventId": "2",
                "home": {
                    "teamid": 100,
                    "name": "Home",
                    "abbreviation": "HOM",
                    "players": [
                        {"playerid": 7, "firstname": "Al", "lastname": "Seven", "jersey": "7", "position": "G"}
                    ]
                },
                "visitor": {
                    "teamid": 200,
                    "name": "Visitor",
                    "abbreviation": "VIS",
                    "players": [
                        {"playerid": 3, "firstname": "Bo", "lastname": "Three", "jersey": "3", "position": "F"}
                    ]
                },
                "moments": [
                    [1, 1445900000000, 700.5, 20.1, null, [
                        [-1, -1, 50.0, 25.0, 5.2],
                        [100, 7, 49.0, 24.0, 0.0]
                    ]],
                    [1, 1445900000040, 700.46, null, null, [
                        [-1, -1, 50.1, 25.0, 5.0]
                    ]]
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_nested_moment_tuples() {
        let game = parse_raw_game(GAME_JSON).expect("payload should parse");
        assert_eq!(game.game_id, "0021500018");
        let event = &game.events[0];
        assert_eq!(event.moments.len(), 2);
        assert_eq!(event.moments[0].rows[0].player_id, BALL_ID);
        assert_eq!(event.moments[0].shot_clock, Some(20.1));
        assert_eq!(event.moments[1].shot_clock, None);
        assert!((event.moments[0].rows[1].x - 49.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_moment() {
        let raw = GAME_JSON.replace("[-1, -1, 50.1, 25.0, 5.0]", "[-1, -1]");
        assert!(parse_raw_game(&raw).is_err());
    }

    #[test]
    fn roster_extraction_spans_both_teams() {
        let game = parse_raw_game(GAME_JSON).expect("payload should parse");
        let (home, visitor, players) = game.rosters();
        assert_eq!(home.team_id, 100);
        assert_eq!(visitor.team_id, 200);
        assert_eq!(players.len(), 2);
        assert_eq!(player_team_map(&players)[&3], 200);
        assert_eq!(possession_team_player_ids(&players, 100), vec![7]);
        assert_eq!(player_lookup(&players)[&7].name, "Al Seven");
    }

    #[test]
    fn parses_game_date() {
        let game = parse_raw_game(GAME_JSON).expect("payload should parse");
        let date = game.parsed_date().expect("date should parse");
        assert_eq!(date.to_string(), "2015-10-29");
    }
}
