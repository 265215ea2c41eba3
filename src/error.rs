use thiserror::Error;

/// Engine failure taxonomy. Resolution and geometry errors are scoped to a
/// single event/candidate and reported by the batch layer; configuration
/// errors abort a batch before any event is processed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("possession unresolvable for event {event_num}: {reason}")]
    Resolution { event_num: i64, reason: String },

    #[error("no made first-half field goal to anchor court direction")]
    MissingAnchor,

    #[error("feature geometry incomplete for candidate {candidate_id}: {detail}")]
    Geometry {
        candidate_id: String,
        detail: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("malformed frame data in event {event_id}: {detail}")]
    MalformedFrame { event_id: String, detail: String },
}

impl EngineError {
    pub(crate) fn geometry(candidate_id: &str, detail: impl Into<String>) -> Self {
        Self::Geometry {
            candidate_id: candidate_id.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn malformed(event_id: &str, detail: impl Into<String>) -> Self {
        Self::MalformedFrame {
            event_id: event_id.to_string(),
            detail: detail.into(),
        }
    }
}
