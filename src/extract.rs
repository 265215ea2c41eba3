use std::collections::HashMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::annotations::{
    AnnotationRow, GameEvent, extend_event_moments, merge_tracking, trim_annotation_rows,
};
use crate::ball_handler::{TrackerConfig, track_ball_handler};
use crate::candidates::{
    Candidate, collect_candidates, remove_duplicate_candidates, shift_event_id,
};
use crate::direction::assign_directions;
use crate::error::EngineError;
use crate::features::{CandidateFeatures, build_feature_vector};
use crate::game_config::GameConfig;
use crate::moments::{Frame, normalize_frames};
use crate::passes::{Pass, segment_passes};
use crate::possession;
use crate::raw_feed::{
    PlayerInfo, RawGame, player_lookup, player_team_map, possession_team_player_ids,
};

#[derive(Debug)]
pub struct EventFailure {
    pub event_id: String,
    pub error: EngineError,
}

#[derive(Debug)]
pub struct CandidateFailure {
    pub candidate_id: String,
    pub error: EngineError,
}

/// Per-game candidate extraction tallies. The counters mirror what a
/// review pass wants to see: how many events even produced passes, and
/// how many of those yielded a hand-off shape.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    pub candidates: Vec<Candidate>,
    pub events_processed: usize,
    pub events_with_passes: usize,
    pub events_with_candidates: usize,
    pub failures: Vec<EventFailure>,
}

#[derive(Debug, Default)]
pub struct FeatureSummary {
    pub vectors: Vec<CandidateFeatures>,
    pub failures: Vec<CandidateFailure>,
}

/// Merge one game's annotations with its tracking payload: trim the rows,
/// resolve possession (unresolvable rows are reported and dropped), join
/// the moment windows, calibrate court direction, and widen each window
/// with its predecessor. A game with no direction anchor is unusable and
/// fails outright.
pub fn process_game(
    game: &RawGame,
    rows: &[AnnotationRow],
    config: &GameConfig,
) -> Result<Vec<GameEvent>, EngineError> {
    let (home, visitor, players) = game.rosters();
    let player_teams = player_team_map(&players);

    let trimmed = trim_annotation_rows(rows, &config.bad_events);
    let mut kept_rows = Vec::with_capacity(trimmed.len());
    let mut possessions = Vec::with_capacity(trimmed.len());
    for row in trimmed {
        match possession::resolve(&row, home, visitor, &player_teams) {
            Ok(team) => {
                kept_rows.push(row);
                possessions.push(team);
            }
            Err(error) => warn!("dropping annotation row: {error}"),
        }
    }

    let mut events = merge_tracking(&kept_rows, &possessions, game);
    assign_directions(&mut events)?;
    extend_event_moments(&mut events);
    debug!(
        "game {}: {} of {} annotation rows merged with tracking",
        game.game_id,
        events.len(),
        kept_rows.len()
    );
    Ok(events)
}

/// Run the detection pipeline over every event of a game and dedup the
/// combined candidate list. Events are independent, so the per-event work
/// fans out across threads; the dedup needs the full ordered list and runs
/// after the join.
pub fn extract_candidates(
    events: &[GameEvent],
    players: &[PlayerInfo],
    config: &GameConfig,
    tracker: TrackerConfig,
) -> ExtractionSummary {
    let lookup = player_lookup(players);

    let results: Vec<(String, Result<(Vec<Candidate>, usize), EngineError>)> = events
        .par_iter()
        .map(|event| {
            (
                event.event_id.clone(),
                extract_event(event, players, &lookup, config, tracker),
            )
        })
        .collect();

    let mut summary = ExtractionSummary {
        events_processed: events.len(),
        ..ExtractionSummary::default()
    };
    let mut all_candidates = Vec::new();
    for (event_id, result) in results {
        match result {
            Ok((candidates, pass_count)) => {
                if pass_count > 0 {
                    summary.events_with_passes += 1;
                }
                if !candidates.is_empty() {
                    summary.events_with_candidates += 1;
                }
                all_candidates.extend(candidates);
            }
            Err(error) => {
                warn!("event {event_id} skipped: {error}");
                summary.failures.push(EventFailure { event_id, error });
            }
        }
    }
    summary.candidates = remove_duplicate_candidates(all_candidates);
    summary
}

fn extract_event(
    event: &GameEvent,
    players: &[PlayerInfo],
    lookup: &HashMap<i64, &PlayerInfo>,
    config: &GameConfig,
    tracker: TrackerConfig,
) -> Result<(Vec<Candidate>, usize), EngineError> {
    let (frames, passes, _) = event_frames_and_passes(event, players, tracker)?;
    let candidates = collect_candidates(event, &frames, &passes, lookup, config)?;
    Ok((candidates, passes.len()))
}

fn event_frames_and_passes(
    event: &GameEvent,
    players: &[PlayerInfo],
    tracker: TrackerConfig,
) -> Result<(Vec<Frame>, Vec<Pass>, Vec<i64>), EngineError> {
    let direction = event.direction.ok_or_else(|| EngineError::Resolution {
        event_num: event.event_num,
        reason: "direction not assigned".to_string(),
    })?;
    let frames = normalize_frames(event, direction)?;
    let offense = possession_team_player_ids(players, event.possession_team);
    let samples = track_ball_handler(&frames, &offense, tracker);
    let passes = segment_passes(&samples);
    Ok((frames, passes, offense))
}

/// Build feature vectors for a deduplicated candidate list. Each event's
/// frames and passes are derived once and shared by its candidates; a
/// geometry failure costs only that candidate, never the batch.
pub fn build_feature_vectors(
    events: &[GameEvent],
    candidates: &[Candidate],
    players: &[PlayerInfo],
    config: &GameConfig,
    tracker: TrackerConfig,
) -> FeatureSummary {
    let lookup = player_lookup(players);

    let per_event: Vec<(Vec<CandidateFeatures>, Vec<CandidateFailure>)> = events
        .par_iter()
        .map(|event| {
            let shifted_id = shift_event_id(&event.event_id, config.event_offset);
            let event_candidates: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| c.event_id == shifted_id)
                .collect();
            if event_candidates.is_empty() {
                return (Vec::new(), Vec::new());
            }

            let mut vectors = Vec::new();
            let mut failures = Vec::new();
            match event_frames_and_passes(event, players, tracker) {
                Ok((frames, passes, offense)) => {
                    for candidate in event_candidates {
                        match build_feature_vector(candidate, &frames, &passes, &lookup, &offense) {
                            Ok(vector) => vectors.push(vector),
                            Err(error) => {
                                warn!("candidate {} skipped: {error}", candidate.candidate_id);
                                failures.push(CandidateFailure {
                                    candidate_id: candidate.candidate_id.clone(),
                                    error,
                                });
                            }
                        }
                    }
                }
                Err(error) => {
                    for candidate in event_candidates {
                        failures.push(CandidateFailure {
                            candidate_id: candidate.candidate_id.clone(),
                            error: EngineError::geometry(
                                &candidate.candidate_id,
                                format!("event frames unavailable: {error}"),
                            ),
                        });
                    }
                }
            }
            (vectors, failures)
        })
        .collect();

    let mut summary = FeatureSummary::default();
    for (vectors, failures) in per_event {
        summary.vectors.extend(vectors);
        summary.failures.extend(failures);
    }
    summary
}
