//! Render lifecycle of one scenario.
//!
//! `Unprocessed -> Rendering -> {Processed | Failed}`. Only `Processed` is persisted (as the
//! document's `has_video` flag); `Failed` collapses back to unprocessed on the next run.

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Lifecycle state of a scenario within one driver run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// No confirmed output exists.
    Unprocessed,
    /// A render is in flight.
    Rendering,
    /// Output confirmed on disk; persisted.
    Processed,
    /// The render aborted; not persisted.
    Failed,
}

/// Inputs to [`advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// Start a render. `force` permits re-rendering a processed scenario.
    Begin {
        /// Overwrite flag from the caller.
        force: bool,
    },
    /// The encoder exited successfully and the output file was verified.
    OutputConfirmed,
    /// The render aborted.
    Fail,
}

/// Outcome of [`advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Move to the contained state.
    To(RenderState),
    /// Leave the scenario and its output alone.
    Skip,
}

impl RenderState {
    /// State loaded from the persisted flag.
    pub fn from_persisted(has_video: bool) -> Self {
        if has_video {
            RenderState::Processed
        } else {
            RenderState::Unprocessed
        }
    }

    /// Value to persist for this state, if it should be persisted at all.
    ///
    /// `Rendering` and `Failed` never write the flag.
    pub fn persisted_flag(self) -> Option<bool> {
        match self {
            RenderState::Processed => Some(true),
            RenderState::Unprocessed => Some(false),
            RenderState::Rendering | RenderState::Failed => None,
        }
    }
}

/// Apply `event` to `state`.
///
/// Pre-conditions: `Begin` only from `Unprocessed`, `Failed` or (with `force`) `Processed`;
/// `OutputConfirmed` and `Fail` only from `Rendering`. Anything else is an evaluation error, so
/// a partial output can never reach `Processed`.
pub fn advance(state: RenderState, event: RenderEvent) -> SlidecastResult<Transition> {
    use RenderEvent as E;
    use RenderState as S;

    match (state, event) {
        (S::Unprocessed | S::Failed, E::Begin { .. }) => Ok(Transition::To(S::Rendering)),
        (S::Processed, E::Begin { force: true }) => Ok(Transition::To(S::Rendering)),
        (S::Processed, E::Begin { force: false }) => Ok(Transition::Skip),
        (S::Rendering, E::OutputConfirmed) => Ok(Transition::To(S::Processed)),
        (S::Rendering, E::Fail) => Ok(Transition::To(S::Failed)),
        (s, e) => Err(SlidecastError::evaluation(format!(
            "invalid render transition {e:?} from {s:?}"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenario/status.rs"]
mod tests;
