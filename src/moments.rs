use crate::annotations::{GameEvent, clock_to_seconds};
use crate::court::BACKCOURT_TRIM_X;
use crate::direction::CourtSide;
use crate::error::EngineError;
use crate::raw_feed::{BALL_ID, RawMoment};

const SHOT_CLOCK_FULL: f64 = 24.0;

/// A player or the ball at one sampled instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub entity_id: i64,
    pub team_id: Option<i64>,
    pub x: f64,
    pub y: f64,
    pub radius: Option<f64>,
}

/// One validated frame: exactly one ball entity plus up to ten players.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    pub game_clock: f64,
    pub shot_clock: f64,
    pub ball: Entity,
    pub players: Vec<Entity>,
}

impl Frame {
    pub fn player(&self, player_id: i64) -> Option<&Entity> {
        self.players.iter().find(|p| p.entity_id == player_id)
    }
}

pub fn frame_at(frames: &[Frame], index: usize) -> Option<&Frame> {
    frames.iter().find(|f| f.index == index)
}

/// Expand an event's raw moment window into validated frames.
///
/// Backcourt moments (ball on the defensive half relative to `direction`)
/// are dropped first; the check is a single ball sample per frame and can
/// misread frames right at center court, which is accepted. The surviving
/// prefix is kept until the shot clock rises above its running value after
/// the game clock has passed the event's recorded time, which marks the
/// tracking window running into the next play. Missing shot clocks read as
/// 0.0 (expired), distinguishing them downstream from live values.
pub fn normalize_frames(
    event: &GameEvent,
    direction: CourtSide,
) -> Result<Vec<Frame>, EngineError> {
    let clock_at_event = clock_to_seconds(&event.clock).ok_or_else(|| {
        EngineError::malformed(&event.event_id, format!("bad clock string {:?}", event.clock))
    })? as f64;

    let mut half_court: Vec<&RawMoment> = Vec::with_capacity(event.moments.len());
    for moment in &event.moments {
        let ball = moment
            .rows
            .iter()
            .find(|r| r.player_id == BALL_ID)
            .ok_or_else(|| EngineError::malformed(&event.event_id, "moment without ball row"))?;
        let frontcourt = match direction {
            CourtSide::Right => ball.x > BACKCOURT_TRIM_X,
            CourtSide::Left => ball.x < BACKCOURT_TRIM_X,
        };
        if frontcourt {
            half_court.push(moment);
        }
    }

    let mut frames = Vec::with_capacity(half_court.len());
    let mut last_shot_clock = SHOT_CLOCK_FULL;
    for (index, moment) in half_court.into_iter().enumerate() {
        let shot_clock = moment.shot_clock.unwrap_or(0.0);
        if shot_clock > last_shot_clock && moment.game_clock < clock_at_event {
            // The window ran past the end of the possession into the next
            // play; everything from here on is discarded, not an error.
            break;
        }
        last_shot_clock = shot_clock;

        let mut ball = None;
        let mut players = Vec::with_capacity(moment.rows.len().saturating_sub(1));
        for row in &moment.rows {
            if row.player_id == BALL_ID {
                ball = Some(Entity {
                    entity_id: BALL_ID,
                    team_id: None,
                    x: row.x,
                    y: row.y,
                    radius: Some(row.radius),
                });
            } else {
                players.push(Entity {
                    entity_id: row.player_id,
                    team_id: Some(row.team_id),
                    x: row.x,
                    y: row.y,
                    radius: None,
                });
            }
        }
        let ball =
            ball.ok_or_else(|| EngineError::malformed(&event.event_id, "moment without ball row"))?;
        frames.push(Frame {
            index,
            game_clock: moment.game_clock,
            shot_clock,
            ball,
            players,
        });
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::GameEvent;
    use crate::raw_feed::RawCoordinate;

    fn ball_row(x: f64) -> RawCoordinate {
        RawCoordinate {
            team_id: -1,
            player_id: BALL_ID,
            x,
            y: 25.0,
            radius: 6.0,
        }
    }

    fn player_row(player_id: i64, x: f64) -> RawCoordinate {
        RawCoordinate {
            team_id: 100,
            player_id,
            x,
            y: 24.0,
            radius: 0.0,
        }
    }

    fn event_with(moments: Vec<RawMoment>) -> GameEvent {
        GameEvent {
            event_id: "g-001".to_string(),
            event_num: 1,
            msg_type: 1,
            period: 1,
            clock: "10:00".to_string(),
            possession_team: 100,
            direction: Some(CourtSide::Right),
            moments,
        }
    }

    fn moment(game_clock: f64, shot_clock: Option<f64>, ball_x: f64) -> RawMoment {
        RawMoment {
            period: 1,
            game_clock,
            shot_clock,
            rows: vec![ball_row(ball_x), player_row(7, ball_x - 1.0)],
        }
    }

    #[test]
    fn backcourt_moments_are_dropped() {
        let event = event_with(vec![
            moment(610.0, Some(20.0), 30.0),
            moment(609.0, Some(19.0), 60.0),
            moment(608.0, Some(18.0), 44.9),
        ]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        assert_eq!(frames.len(), 1);
        assert!((frames[0].ball.x - 60.0).abs() < 1e-9);

        let frames = normalize_frames(&event, CourtSide::Left).unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn shot_clock_reset_truncates_past_event_clock() {
        // 10:00 event clock = 600s. The 596.0 moment with a refreshed shot
        // clock is the next possession and must cut the window.
        let event = event_with(vec![
            moment(601.0, Some(10.0), 60.0),
            moment(600.0, Some(9.0), 61.0),
            moment(599.0, Some(8.2), 62.0),
            moment(596.0, Some(24.0), 63.0),
            moment(595.0, Some(23.0), 64.0),
        ]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames.last().unwrap().index, 2);
    }

    #[test]
    fn shot_clock_rise_before_event_clock_is_kept() {
        // Game clock still above the event's recorded time: a rising shot
        // clock there is the previous play winding down, not a reset.
        let event = event_with(vec![
            moment(620.0, Some(5.0), 60.0),
            moment(619.0, Some(24.0), 60.0),
            moment(618.0, Some(23.0), 60.0),
        ]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        assert_eq!(frames.len(), 3);
    }

    #[test]
    fn missing_shot_clock_reads_as_expired() {
        let event = event_with(vec![moment(610.0, None, 60.0)]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        assert_eq!(frames[0].shot_clock, 0.0);
    }

    #[test]
    fn frame_indices_count_from_zero_after_trim() {
        let event = event_with(vec![
            moment(610.0, Some(20.0), 30.0),
            moment(609.0, Some(19.0), 60.0),
            moment(608.0, Some(18.0), 61.0),
        ]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(frame_at(&frames, 1).is_some());
        assert!(frame_at(&frames, 5).is_none());
    }

    #[test]
    fn moment_without_ball_is_malformed() {
        let mut bad = moment(610.0, Some(20.0), 60.0);
        bad.rows.retain(|r| r.player_id != BALL_ID);
        let event = event_with(vec![bad]);
        let err = normalize_frames(&event, CourtSide::Right).unwrap_err();
        assert!(matches!(err, EngineError::MalformedFrame { .. }));
    }

    #[test]
    fn players_and_ball_are_separated() {
        let event = event_with(vec![moment(610.0, Some(20.0), 60.0)]);
        let frames = normalize_frames(&event, CourtSide::Right).unwrap();
        let frame = &frames[0];
        assert_eq!(frame.ball.entity_id, BALL_ID);
        assert!(frame.ball.team_id.is_none());
        assert_eq!(frame.players.len(), 1);
        assert_eq!(frame.player(7).unwrap().team_id, Some(100));
        assert!(frame.player(99).is_none());
    }
}
