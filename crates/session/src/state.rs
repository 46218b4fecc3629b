//! Session lifecycle state machine

/// Playback session state
///
/// ```text
/// Idle -> Loaded -> Tracking <-> Paused
///                      |  ^        |
///                      v  |        v
///                     Seeking (transient, returns to Tracking / Paused)
/// Tracking -> Ended -> Tracking (play / seek)
/// any -> Destroyed (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Source ready, playback not running
    Loaded,
    /// Playing; one frame request outstanding
    Tracking,
    /// Paused by caller or host
    Paused,
    /// Seek in progress
    Seeking,
    /// Media reached its end
    Ended,
    /// Terminal
    Destroyed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loaded => "loaded",
            SessionState::Tracking => "tracking",
            SessionState::Paused => "paused",
            SessionState::Seeking => "seeking",
            SessionState::Ended => "ended",
            SessionState::Destroyed => "destroyed",
        }
    }

    /// A source is attached and ready
    pub fn is_ready(self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Destroyed)
    }

    /// State a completed seek returns to
    pub fn after_seek(self) -> SessionState {
        match self {
            SessionState::Tracking => SessionState::Tracking,
            SessionState::Loaded => SessionState::Loaded,
            _ => SessionState::Paused,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
