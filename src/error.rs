use thiserror::Error;

/// Failure taxonomy for the remote grid. `AuthRequired` is the only variant
/// the shell reacts to specially (interactive re-authorization, then one
/// retry); everything else surfaces as a generic "failed to load" state.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("authorization required")]
    AuthRequired,
    #[error("remote rejected the request: {0}")]
    Remote(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed payload: {0}")]
    Decode(String),
}

impl SourceError {
    /// A transport failure on a write leaves the write's fate unknown; the
    /// caller falls back to a full re-fetch in that case only.
    pub fn write_outcome_unknown(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}
