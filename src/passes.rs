use crate::ball_handler::HandlerSample;

/// A repeated passer inside this many frames of the previous emission is
/// treated as boundary oscillation, not a second pass.
const PASSER_REPEAT_WINDOW: usize = 10;

/// Null runs up to this long bounded by the same handler are tracking
/// dropouts, not real transits.
const DROPOUT_FILL_MAX: usize = 2;

/// A detected transfer of ball control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    pub passer_id: i64,
    pub pass_frame: usize,
    pub receiver_id: i64,
    pub receive_frame: usize,
}

#[derive(Debug, Clone, Copy)]
enum State {
    NoPasser,
    HasPasser { passer: i64 },
    InTransit { passer: i64, pass_frame: usize },
}

/// Convert the per-frame handler sequence into discrete passes.
///
/// One forward scan over {NoPasser, HasPasser, InTransit}: losing the
/// handler opens a transit and pins the pass frame to the last held frame;
/// the ball coming back to the same player cancels the transit (dribble
/// blip); a different player closing the transit emits a pass and resets.
pub fn segment_passes(samples: &[HandlerSample]) -> Vec<Pass> {
    let samples = fill_tracking_dropouts(samples);
    let mut passes: Vec<Pass> = Vec::new();
    let mut state = State::NoPasser;

    for i in 0..samples.len() {
        let current = samples[i].player_id;
        state = match (state, current) {
            (State::NoPasser, Some(player)) => State::HasPasser { passer: player },
            (State::NoPasser, None) => State::NoPasser,

            (State::HasPasser { passer }, Some(player)) if player == passer => {
                State::HasPasser { passer }
            }
            (State::HasPasser { passer }, Some(receiver)) => {
                // Direct hand-off with no airborne frame in between.
                emit(
                    &mut passes,
                    passer,
                    samples[i - 1].frame_index,
                    receiver,
                    samples[i].frame_index,
                );
                State::NoPasser
            }
            (State::HasPasser { passer }, None) => State::InTransit {
                passer,
                pass_frame: samples[i - 1].frame_index,
            },

            (State::InTransit { passer, .. }, Some(player)) if player == passer => {
                State::HasPasser { passer }
            }
            (State::InTransit { passer, pass_frame }, Some(receiver)) => {
                let pass_frame = match samples[i - 1].player_id {
                    Some(_) => samples[i - 1].frame_index,
                    None => pass_frame,
                };
                emit(
                    &mut passes,
                    passer,
                    pass_frame,
                    receiver,
                    samples[i].frame_index,
                );
                State::NoPasser
            }
            (state @ State::InTransit { .. }, None) => state,
        };
    }
    passes
}

fn emit(
    passes: &mut Vec<Pass>,
    passer_id: i64,
    pass_frame: usize,
    receiver_id: i64,
    receive_frame: usize,
) {
    let duplicate = passes.last().is_some_and(|last| {
        last.passer_id == passer_id && pass_frame <= last.pass_frame + PASSER_REPEAT_WINDOW
    });
    if !duplicate {
        passes.push(Pass {
            passer_id,
            pass_frame,
            receiver_id,
            receive_frame,
        });
    }
}

/// Fill short null runs bounded by the same handler on both sides so a
/// single-frame dropout cannot split one real possession into two.
pub fn fill_tracking_dropouts(samples: &[HandlerSample]) -> Vec<HandlerSample> {
    let mut filled = samples.to_vec();
    let mut i = 0;
    while i < filled.len() {
        if filled[i].player_id.is_some() {
            i += 1;
            continue;
        }
        let run_start = i;
        let mut run_end = i;
        while run_end + 1 < filled.len() && filled[run_end + 1].player_id.is_none() {
            run_end += 1;
        }
        let run_len = run_end - run_start + 1;
        if run_len <= DROPOUT_FILL_MAX && run_start > 0 && run_end + 1 < filled.len() {
            let before = filled[run_start - 1].player_id;
            let after = filled[run_end + 1].player_id;
            if before.is_some() && before == after {
                for sample in &mut filled[run_start..=run_end] {
                    sample.player_id = before;
                }
            }
        }
        i = run_end + 1;
    }
    filled
}
