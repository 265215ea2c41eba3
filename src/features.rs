use std::collections::HashMap;

use serde::Serialize;

use crate::annotations::clock_to_seconds;
use crate::candidates::{Candidate, check_for_inbound_pass};
use crate::court::{HALF_COURT_X, euclidean, hexbin_vertex_key, rotate_about_center};
use crate::error::EngineError;
use crate::moments::{Entity, Frame, frame_at};
use crate::passes::Pass;
use crate::raw_feed::PlayerInfo;

/// Court feet per second to miles per hour.
const FPS_TO_MPH: f64 = 0.681818;

/// Half the analysis window, in game-clock seconds, on each side of the
/// hand-off.
const WINDOW_HALF_SPAN: f64 = 2.0;

/// The fixed per-candidate feature schema handed to the classifiers.
/// Player A is the screener (passer), player B the cutter (receiver).
/// Every value is computed in the court-side-invariant frame.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFeatures {
    pub classification: Option<bool>,
    pub candidate_id: String,

    pub cutter_archetype: String,
    pub screener_archetype: String,

    pub cutter_loc_on_pass: String,
    pub screener_loc_on_pass: String,
    pub ball_loc_on_pass: String,
    pub ball_radius_on_pass: f64,
    pub cutter_loc_on_start_approach: String,
    pub screener_loc_on_start_approach: String,
    pub ball_loc_on_start_approach: String,
    pub ball_radius_loc_on_start_approach: f64,
    pub cutter_loc_on_end_execution: String,
    pub screener_loc_on_end_execution: String,
    pub ball_loc_on_end_execution: String,
    pub ball_radius_loc_on_end_execution: f64,
    pub cutter_loc_on_screen: String,
    pub screener_loc_on_screen: String,
    pub ball_loc_on_screen: String,
    pub ball_radius_on_screen: f64,

    pub cutter_dist_traveled_approach: f64,
    pub cutter_dist_traveled_execution: f64,
    pub screener_dist_traveled_approach: f64,
    pub screener_dist_traveled_execution: f64,
    pub ball_dist_traveled_approach: f64,
    pub ball_dist_traveled_execution: f64,

    pub players_dist_on_pass: f64,
    pub cutter_dist_from_ball_on_pass: f64,
    pub screener_dist_from_ball_on_pass: f64,
    pub players_dist_on_screen: f64,
    pub cutter_dist_from_ball_on_screen: f64,
    pub screener_dist_from_ball_on_screen: f64,
    pub players_dist_on_start_approach: f64,
    pub cutter_dist_from_ball_on_approach: f64,
    pub screener_dist_from_ball_on_approach: f64,
    pub players_dist_on_end_execution: f64,
    pub cutter_dist_from_ball_on_execution: f64,
    pub screener_dist_from_ball_on_execution: f64,

    pub cutter_avg_speed_approach: f64,
    pub cutter_avg_speed_execution: f64,
    pub screener_avg_speed_approach: f64,
    pub screener_avg_speed_execution: f64,
    pub ball_avg_speed_approach: f64,
    pub ball_avg_speed_execution: f64,

    pub slope_of_cutter_trajectory_approach: f64,
    pub intercept_of_cutter_trajectory_approach: f64,
    pub slope_of_cutter_trajectory_execution: f64,
    pub intercept_of_cutter_trajectory_execution: f64,
    pub slope_of_screener_trajectory_approach: f64,
    pub intercept_of_screener_trajectory_approach: f64,
    pub slope_of_screener_trajectory_execution: f64,
    pub intercept_of_screener_trajectory_execution: f64,
    pub slope_of_ball_trajectory_approach: f64,
    pub intercept_of_ball_trajectory_approach: f64,
    pub slope_of_ball_trajectory_execution: f64,
    pub intercept_of_ball_trajectory_execution: f64,

    pub offset_into_play: i64,
    pub pass_duration: Option<i64>,
    pub num_players_past_half_court: usize,
    pub is_inbounds_pass: bool,
}

/// Derive the feature vector for one confirmed candidate.
///
/// Frames are the candidate event's normalized frames; passes are that
/// event's segmented passes. Any participant or ball sample missing at a
/// required instant fails the candidate, since a defaulted value would
/// silently corrupt the downstream feature matrix.
pub fn build_feature_vector(
    candidate: &Candidate,
    frames: &[Frame],
    passes: &[Pass],
    players: &HashMap<i64, &PlayerInfo>,
    offensive_player_ids: &[i64],
) -> Result<CandidateFeatures, EngineError> {
    let id = candidate.candidate_id.as_str();
    let screener_id = candidate.player_a_id;
    let cutter_id = candidate.player_b_id;

    let clock = clock_to_seconds(&candidate.game_clock).ok_or_else(|| {
        EngineError::geometry(id, format!("bad game clock {:?}", candidate.game_clock))
    })? as f64;

    let mut window: Vec<Frame> = frames
        .iter()
        .filter(|f| {
            f.game_clock > clock - WINDOW_HALF_SPAN && f.game_clock < clock + WINDOW_HALF_SPAN
        })
        .cloned()
        .collect();
    let midpoint = window.len().div_ceil(2);
    if window.len() < 2 || midpoint >= window.len() {
        return Err(EngineError::geometry(id, "analysis window too small"));
    }

    if window[midpoint].ball.x > HALF_COURT_X {
        for frame in &mut window {
            rotate_frame(frame);
        }
    }

    // Frames run in game order, so the approach (clock still above the
    // hand-off time) is the leading slice and the execution the trailing
    // one.
    let approach: Vec<&Frame> = window.iter().filter(|f| f.game_clock > clock).collect();
    let execution: Vec<&Frame> = window.iter().filter(|f| f.game_clock < clock).collect();

    let pass_frame = &window[midpoint];
    let start_frame = *approach
        .first()
        .ok_or_else(|| EngineError::geometry(id, "empty approach window"))?;
    let end_frame = *execution
        .last()
        .ok_or_else(|| EngineError::geometry(id, "empty execution window"))?;
    let tightest_frame = screen_frame(&window, screener_id, cutter_id)
        .ok_or_else(|| EngineError::geometry(id, "participants never share a frame"))?;

    let on_pass = snapshot(pass_frame, screener_id, cutter_id, id, "pass")?;
    let on_start = snapshot(start_frame, screener_id, cutter_id, id, "approach start")?;
    let on_end = snapshot(end_frame, screener_id, cutter_id, id, "execution end")?;
    let on_screen = snapshot(tightest_frame, screener_id, cutter_id, id, "screen")?;

    let cutter_approach = entity_path(&approach, Some(cutter_id));
    let cutter_execution = entity_path(&execution, Some(cutter_id));
    let screener_approach = entity_path(&approach, Some(screener_id));
    let screener_execution = entity_path(&execution, Some(screener_id));
    let ball_approach = entity_path(&approach, None);
    let ball_execution = entity_path(&execution, None);

    let approach_span = clock_span(&approach, id, "approach")?;
    let execution_span = clock_span(&execution, id, "execution")?;

    let cutter_line_approach = linregress(&cutter_approach, id, "cutter approach")?;
    let cutter_line_execution = linregress(&cutter_execution, id, "cutter execution")?;
    let screener_line_approach = linregress(&screener_approach, id, "screener approach")?;
    let screener_line_execution = linregress(&screener_execution, id, "screener execution")?;
    let ball_line_approach = linregress(&ball_approach, id, "ball approach")?;
    let ball_line_execution = linregress(&ball_execution, id, "ball execution")?;

    let ball_side_count = offensive_player_ids
        .iter()
        .filter_map(|&player_id| pass_frame.player(player_id))
        .filter(|p| {
            if pass_frame.ball.x > HALF_COURT_X {
                p.x > HALF_COURT_X
            } else {
                p.x < HALF_COURT_X
            }
        })
        .count();

    let pass_duration = passes
        .iter()
        .find(|p| {
            frame_at(frames, p.pass_frame).is_some_and(|f| f.shot_clock == candidate.shot_clock)
        })
        .map(|p| (p.receive_frame - p.pass_frame) as i64);

    let is_inbounds_pass = passes
        .first()
        .is_some_and(|p| check_for_inbound_pass(frames, p));

    Ok(CandidateFeatures {
        classification: candidate.manual_label,
        candidate_id: candidate.candidate_id.clone(),

        cutter_archetype: archetype(players, cutter_id, id)?,
        screener_archetype: archetype(players, screener_id, id)?,

        cutter_loc_on_pass: hexbin_vertex_key(on_pass.cutter.0, on_pass.cutter.1),
        screener_loc_on_pass: hexbin_vertex_key(on_pass.screener.0, on_pass.screener.1),
        ball_loc_on_pass: hexbin_vertex_key(on_pass.ball.0, on_pass.ball.1),
        ball_radius_on_pass: on_pass.ball_radius,
        cutter_loc_on_start_approach: hexbin_vertex_key(on_start.cutter.0, on_start.cutter.1),
        screener_loc_on_start_approach: hexbin_vertex_key(
            on_start.screener.0,
            on_start.screener.1,
        ),
        ball_loc_on_start_approach: hexbin_vertex_key(on_start.ball.0, on_start.ball.1),
        ball_radius_loc_on_start_approach: on_start.ball_radius,
        cutter_loc_on_end_execution: hexbin_vertex_key(on_end.cutter.0, on_end.cutter.1),
        screener_loc_on_end_execution: hexbin_vertex_key(on_end.screener.0, on_end.screener.1),
        ball_loc_on_end_execution: hexbin_vertex_key(on_end.ball.0, on_end.ball.1),
        ball_radius_loc_on_end_execution: on_end.ball_radius,
        cutter_loc_on_screen: hexbin_vertex_key(on_screen.cutter.0, on_screen.cutter.1),
        screener_loc_on_screen: hexbin_vertex_key(on_screen.screener.0, on_screen.screener.1),
        ball_loc_on_screen: hexbin_vertex_key(on_screen.ball.0, on_screen.ball.1),
        ball_radius_on_screen: on_screen.ball_radius,

        cutter_dist_traveled_approach: travel_dist(&cutter_approach),
        cutter_dist_traveled_execution: travel_dist(&cutter_execution),
        screener_dist_traveled_approach: travel_dist(&screener_approach),
        screener_dist_traveled_execution: travel_dist(&screener_execution),
        ball_dist_traveled_approach: travel_dist(&ball_approach),
        ball_dist_traveled_execution: travel_dist(&ball_execution),

        players_dist_on_pass: point_dist(on_pass.cutter, on_pass.screener),
        cutter_dist_from_ball_on_pass: point_dist(on_pass.cutter, on_pass.ball),
        screener_dist_from_ball_on_pass: point_dist(on_pass.screener, on_pass.ball),
        players_dist_on_screen: point_dist(on_screen.cutter, on_screen.screener),
        cutter_dist_from_ball_on_screen: point_dist(on_screen.cutter, on_screen.ball),
        screener_dist_from_ball_on_screen: point_dist(on_screen.screener, on_screen.ball),
        players_dist_on_start_approach: point_dist(on_start.cutter, on_start.screener),
        cutter_dist_from_ball_on_approach: point_dist(on_start.cutter, on_start.ball),
        screener_dist_from_ball_on_approach: point_dist(on_start.screener, on_start.ball),
        players_dist_on_end_execution: point_dist(on_end.cutter, on_end.screener),
        cutter_dist_from_ball_on_execution: point_dist(on_end.cutter, on_end.ball),
        screener_dist_from_ball_on_execution: point_dist(on_end.screener, on_end.ball),

        cutter_avg_speed_approach: average_speed(&cutter_approach, approach_span),
        cutter_avg_speed_execution: average_speed(&cutter_execution, execution_span),
        screener_avg_speed_approach: average_speed(&screener_approach, approach_span),
        screener_avg_speed_execution: average_speed(&screener_execution, execution_span),
        ball_avg_speed_approach: average_speed(&ball_approach, approach_span),
        ball_avg_speed_execution: average_speed(&ball_execution, execution_span),

        slope_of_cutter_trajectory_approach: cutter_line_approach.0,
        intercept_of_cutter_trajectory_approach: cutter_line_approach.1,
        slope_of_cutter_trajectory_execution: cutter_line_execution.0,
        intercept_of_cutter_trajectory_execution: cutter_line_execution.1,
        slope_of_screener_trajectory_approach: screener_line_approach.0,
        intercept_of_screener_trajectory_approach: screener_line_approach.1,
        slope_of_screener_trajectory_execution: screener_line_execution.0,
        intercept_of_screener_trajectory_execution: screener_line_execution.1,
        slope_of_ball_trajectory_approach: ball_line_approach.0,
        intercept_of_ball_trajectory_approach: ball_line_approach.1,
        slope_of_ball_trajectory_execution: ball_line_execution.0,
        intercept_of_ball_trajectory_execution: ball_line_execution.1,

        offset_into_play: (pass_frame.shot_clock / 6.0).floor() as i64,
        pass_duration,
        num_players_past_half_court: ball_side_count,
        is_inbounds_pass,
    })
}

struct Snapshot {
    cutter: (f64, f64),
    screener: (f64, f64),
    ball: (f64, f64),
    ball_radius: f64,
}

fn snapshot(
    frame: &Frame,
    screener_id: i64,
    cutter_id: i64,
    candidate_id: &str,
    instant: &str,
) -> Result<Snapshot, EngineError> {
    let locate = |player_id: i64| -> Result<(f64, f64), EngineError> {
        frame
            .player(player_id)
            .map(|p| (p.x, p.y))
            .ok_or_else(|| {
                EngineError::geometry(
                    candidate_id,
                    format!("player {player_id} absent at {instant} frame"),
                )
            })
    };
    Ok(Snapshot {
        cutter: locate(cutter_id)?,
        screener: locate(screener_id)?,
        ball: (frame.ball.x, frame.ball.y),
        ball_radius: frame.ball.radius.unwrap_or(0.0),
    })
}

fn rotate_frame(frame: &mut Frame) {
    let rotate = |entity: &mut Entity| {
        let (x, y) = rotate_about_center(entity.x, entity.y);
        entity.x = x;
        entity.y = y;
    };
    rotate(&mut frame.ball);
    for player in &mut frame.players {
        rotate(player);
    }
}

/// The screen instant is wherever the two participants come closest.
fn screen_frame<'a>(window: &'a [Frame], screener_id: i64, cutter_id: i64) -> Option<&'a Frame> {
    window
        .iter()
        .filter_map(|frame| {
            let screener = frame.player(screener_id)?;
            let cutter = frame.player(cutter_id)?;
            Some((euclidean(screener.x, screener.y, cutter.x, cutter.y), frame))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, frame)| frame)
}

/// Positions of one entity across a sub-window, in frame order. `None`
/// selects the ball. Frames where the entity is absent contribute nothing.
fn entity_path(frames: &[&Frame], player_id: Option<i64>) -> Vec<(f64, f64)> {
    frames
        .iter()
        .filter_map(|frame| match player_id {
            Some(id) => frame.player(id).map(|p| (p.x, p.y)),
            None => Some((frame.ball.x, frame.ball.y)),
        })
        .collect()
}

pub fn travel_dist(path: &[(f64, f64)]) -> f64 {
    path.windows(2)
        .map(|pair| euclidean(pair[0].0, pair[0].1, pair[1].0, pair[1].1))
        .sum()
}

fn average_speed(path: &[(f64, f64)], span_seconds: f64) -> f64 {
    travel_dist(path) / span_seconds * FPS_TO_MPH
}

fn clock_span(frames: &[&Frame], candidate_id: &str, name: &str) -> Result<f64, EngineError> {
    let max = frames.iter().map(|f| f.game_clock).fold(f64::MIN, f64::max);
    let min = frames.iter().map(|f| f.game_clock).fold(f64::MAX, f64::min);
    let span = max - min;
    if frames.is_empty() || span <= 0.0 {
        return Err(EngineError::geometry(
            candidate_id,
            format!("{name} window has no clock span"),
        ));
    }
    Ok(span)
}

/// Least-squares line through the x-y trajectory. A perfectly vertical
/// path (zero x variance) regresses to a flat line through the mean
/// rather than poisoning the matrix with NaN.
fn linregress(
    path: &[(f64, f64)],
    candidate_id: &str,
    name: &str,
) -> Result<(f64, f64), EngineError> {
    if path.len() < 2 {
        return Err(EngineError::geometry(
            candidate_id,
            format!("{name} trajectory has fewer than two samples"),
        ));
    }
    let n = path.len() as f64;
    let mean_x = path.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = path.iter().map(|p| p.1).sum::<f64>() / n;
    let var_x = path.iter().map(|p| (p.0 - mean_x).powi(2)).sum::<f64>();
    if var_x == 0.0 {
        return Ok((0.0, mean_y));
    }
    let cov = path
        .iter()
        .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
        .sum::<f64>();
    let slope = cov / var_x;
    Ok((slope, mean_y - slope * mean_x))
}

fn point_dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    euclidean(a.0, a.1, b.0, b.1)
}

fn archetype(
    players: &HashMap<i64, &PlayerInfo>,
    player_id: i64,
    candidate_id: &str,
) -> Result<String, EngineError> {
    players
        .get(&player_id)
        .map(|p| p.position.clone())
        .ok_or_else(|| {
            EngineError::geometry(
                candidate_id,
                format!("player {player_id} missing from roster"),
            )
        })
}
