//! Detail expansion cache: per-file expansion state over a summary result set.
//!
//! Each file name owns a small state machine:
//!
//! ```text
//! Collapsed ──toggle──▶ Loading ──fetch ok──▶ Expanded
//!     ▲                    │                     │
//!     └─────fetch failed───┘                     │
//!     └──────────────────────toggle──────────────┘
//! Collapsed (detail cached) ──toggle──▶ Expanded   (no fetch)
//! ```
//!
//! `transition` is pure: it maps (state, event) to (new state, effect) and
//! leaves running the effect to the caller.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Loading,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionEvent {
    Toggle,
    FetchSucceeded,
    FetchFailed,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionEffect {
    None,
    /// Request the detail from the evaluation service.
    FetchDetail,
    /// Write the fetched detail into the summary record. Performed before
    /// the new state is stored.
    MergeDetail,
}

/// Expansion state of one file plus whether its detail is already in the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeyState {
    pub phase: ExpansionState,
    pub detail_cached: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("details are already loading")]
    AlreadyLoading,
    #[error("no detail fetch is in flight")]
    NotLoading,
}

pub fn transition(
    current: KeyState,
    event: ExpansionEvent,
) -> Result<(KeyState, ExpansionEffect), TransitionError> {
    use ExpansionEffect as Fx;
    use ExpansionEvent as Ev;
    use ExpansionState as St;

    match (current.phase, event) {
        (St::Collapsed, Ev::Toggle) if current.detail_cached => Ok((
            KeyState {
                phase: St::Expanded,
                ..current
            },
            Fx::None,
        )),
        (St::Collapsed, Ev::Toggle) => Ok((
            KeyState {
                phase: St::Loading,
                ..current
            },
            Fx::FetchDetail,
        )),
        (St::Expanded, Ev::Toggle) => Ok((
            KeyState {
                phase: St::Collapsed,
                ..current
            },
            Fx::None,
        )),
        (St::Loading, Ev::Toggle) => Err(TransitionError::AlreadyLoading),
        (St::Loading, Ev::FetchSucceeded) => Ok((
            KeyState {
                phase: St::Expanded,
                detail_cached: true,
            },
            Fx::MergeDetail,
        )),
        (St::Loading, Ev::FetchFailed) => Ok((
            KeyState {
                phase: St::Collapsed,
                ..current
            },
            Fx::None,
        )),
        (_, Ev::FetchSucceeded | Ev::FetchFailed) => Err(TransitionError::NotLoading),
    }
}

/// Arena of per-file states. Keys appear lazily on first toggle.
#[derive(Debug, Clone, Default)]
pub struct DetailCache {
    entries: HashMap<String, KeyState>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> KeyState {
        self.entries.get(file_name).copied().unwrap_or_default()
    }

    pub fn state_of(&self, file_name: &str) -> ExpansionState {
        self.get(file_name).phase
    }

    /// Computes the transition without storing it.
    pub fn peek(
        &self,
        file_name: &str,
        event: ExpansionEvent,
    ) -> Result<(KeyState, ExpansionEffect), TransitionError> {
        transition(self.get(file_name), event)
    }

    /// Applies `event` to `file_name` and returns the effect to run.
    pub fn apply(
        &mut self,
        file_name: &str,
        event: ExpansionEvent,
    ) -> Result<ExpansionEffect, TransitionError> {
        let (next, effect) = self.peek(file_name, event)?;
        self.entries.insert(file_name.to_string(), next);
        Ok(effect)
    }

    pub fn loading_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| s.phase == ExpansionState::Loading)
            .count()
    }

    /// Forgets every key; used when a new summary replaces the store.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
