use std::{fmt, str::FromStr, time::Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::dao::models::{RoomEntity, RoomTransition};

/// Lifecycle status of a room. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RoomStatus {
    /// Created, waiting for someone to start it.
    #[serde(rename = "not started")]
    NotStarted,
    /// Opening question generated; discussion is running.
    #[serde(rename = "inprogress")]
    InProgress,
    /// Discussion is over.
    #[serde(rename = "done")]
    Concluded,
}

impl RoomStatus {
    /// Wire and column representation of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            RoomStatus::NotStarted => "not started",
            RoomStatus::InProgress => "inprogress",
            RoomStatus::Concluded => "done",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status string does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown room status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for RoomStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "not started" => Ok(RoomStatus::NotStarted),
            "inprogress" => Ok(RoomStatus::InProgress),
            "done" => Ok(RoomStatus::Concluded),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Events that move a room through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Generate the opening question and open the discussion.
    Start,
    /// Record the written conclusion and close the room.
    Conclude,
    /// Close the room without touching its conclusion.
    MarkDone,
}

impl fmt::Display for RoomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoomEvent::Start => "start",
            RoomEvent::Conclude => "conclude",
            RoomEvent::MarkDone => "mark as done",
        })
    }
}

/// Error returned when an event cannot be applied from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {event} a room whose status is \"{from}\"")]
pub struct InvalidTransition {
    /// Status the room was in when the event was received.
    pub from: RoomStatus,
    /// The rejected event.
    pub event: RoomEvent,
}

/// Error returned when a plan is completed without the field its target status depends on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompleteTransition {
    /// Starting without a non-blank opening question.
    #[error("starting a room requires an opening question")]
    MissingQuestion,
    /// Concluding without a non-blank conclusion.
    #[error("concluding a room requires a conclusion")]
    MissingConclusion,
}

/// Fields produced by the work attached to a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    /// Opening question to store, required when starting.
    pub initial_question: Option<String>,
    /// Conclusion to store, required when concluding.
    pub conclusion: Option<String>,
}

impl RoomUpdate {
    /// Update carrying only an opening question.
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            initial_question: Some(question.into()),
            conclusion: None,
        }
    }

    /// Update carrying only a conclusion.
    pub fn conclusion(conclusion: impl Into<String>) -> Self {
        Self {
            initial_question: None,
            conclusion: Some(conclusion.into()),
        }
    }
}

/// A validated transition that has not been written yet.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Room the plan applies to.
    pub room_id: String,
    /// Status observed when the plan was made; the write is guarded on it.
    pub from: RoomStatus,
    /// Status the room moves to.
    pub to: RoomStatus,
    /// Event being applied.
    pub event: RoomEvent,
    /// When the plan was created, used to report transition latency.
    pub planned_at: Instant,
}

impl Plan {
    /// Validate that `event` can be applied to `room` in its current status.
    pub fn new(room: &RoomEntity, event: RoomEvent) -> Result<Self, InvalidTransition> {
        let to = next_status(room.status, event)?;
        Ok(Self {
            room_id: room.id.clone(),
            from: room.status,
            to,
            event,
            planned_at: Instant::now(),
        })
    }

    /// Turn the plan into the guarded store write, checking that the dependent
    /// field of the target status is present.
    pub fn into_write(self, update: RoomUpdate) -> Result<RoomTransition, IncompleteTransition> {
        let RoomUpdate {
            initial_question,
            conclusion,
        } = update;

        if self.to == RoomStatus::InProgress && !is_present(&initial_question) {
            return Err(IncompleteTransition::MissingQuestion);
        }
        if self.event == RoomEvent::Conclude && !is_present(&conclusion) {
            return Err(IncompleteTransition::MissingConclusion);
        }

        Ok(RoomTransition {
            room_id: self.room_id,
            from: self.from,
            to: self.to,
            initial_question,
            conclusion,
        })
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}

/// Compute the status reached by applying `event` from `from`.
pub fn next_status(from: RoomStatus, event: RoomEvent) -> Result<RoomStatus, InvalidTransition> {
    let next = match (from, event) {
        (RoomStatus::NotStarted, RoomEvent::Start) => RoomStatus::InProgress,
        (RoomStatus::InProgress, RoomEvent::Conclude) => RoomStatus::Concluded,
        (RoomStatus::InProgress, RoomEvent::MarkDone) => RoomStatus::Concluded,
        // Marking an already closed room done again is a no-op.
        (RoomStatus::Concluded, RoomEvent::MarkDone) => RoomStatus::Concluded,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
