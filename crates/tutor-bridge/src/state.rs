use std::fmt;

/// Lifecycle of a stream bridge.
///
/// ```text
/// Connecting -> Open -> Closed
///          \-> Error -> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeState {
    Connecting,
    Open,
    Error,
    Closed,
}

impl BridgeState {
    /// Whether input written now would reach the remote.
    pub fn accepts_input(self) -> bool {
        self == BridgeState::Open
    }

    /// No transition leads back to a live stream from here.
    pub fn is_finished(self) -> bool {
        matches!(self, BridgeState::Error | BridgeState::Closed)
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BridgeState::Connecting => "connecting",
            BridgeState::Open => "open",
            BridgeState::Error => "error",
            BridgeState::Closed => "closed",
        };
        f.write_str(label)
    }
}
