//! Build state machine.
//!
//! ```text
//! Idle ─► ClientPhaseRunning ─► WaitingForManifest ─► ServerPhaseRunning ─► Rendering ─► Done
//!   │              │                    │                     │                 │
//!   └──────────────┴────────────────────┴──────────┬──────────┴─────────────────┘
//!                                                  ▼
//!                                                Failed
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    ClientPhaseRunning,
    WaitingForManifest,
    ServerPhaseRunning,
    Rendering,
    Done,
    Failed,
}

impl BuildState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` is a legal transition from `self`.
    pub const fn can_advance_to(self, next: Self) -> bool {
        use BuildState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, ClientPhaseRunning)
            | (ClientPhaseRunning, WaitingForManifest)
            | (WaitingForManifest, ServerPhaseRunning)
            | (ServerPhaseRunning, Rendering)
            | (Rendering, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ClientPhaseRunning => "client phase",
            Self::WaitingForManifest => "waiting for manifest",
            Self::ServerPhaseRunning => "server phase",
            Self::Rendering => "rendering",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
