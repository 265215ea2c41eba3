//! Spatiotemporal play-event detection over SportVU optical tracking
//! data. Raw per-frame positions and play-by-play annotations go in;
//! labeled dribble-hand-off candidates and fixed-schema feature vectors
//! for downstream classifiers come out.

pub mod annotations;
pub mod ball_handler;
pub mod candidates;
pub mod court;
pub mod direction;
pub mod error;
pub mod extract;
pub mod features;
pub mod game_config;
pub mod moments;
pub mod passes;
pub mod possession;
pub mod raw_feed;
