use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};

use crate::domain::types::{ReviewResult, ServiceLimits, SessionId, StatusSnapshot};

/// What the unified patch or an issue's recommended code was copied from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Issue(usize),
    Patch,
}

#[derive(Debug)]
pub enum Action {
    Input { code: KeyCode, modifiers: KeyModifiers },
    Paste(String),
    Tick,
    LimitsLoaded(ServiceLimits),
    Submitted {
        epoch: u64,
        result: Result<SessionId, String>,
    },
    StatusPolled {
        session: SessionId,
        snapshot: StatusSnapshot,
    },
    PollTimedOut {
        session: SessionId,
        after: Duration,
    },
    ReviewLoaded {
        session: SessionId,
        result: Result<ReviewResult, String>,
    },
    Copied {
        session: SessionId,
        target: CopyTarget,
        result: Result<(), String>,
    },
    Downloaded {
        session: SessionId,
        result: Result<PathBuf, String>,
    },
}
