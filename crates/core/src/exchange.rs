//! Exchange request vocabulary and the status state machine.
//!
//! A request starts `pending`. The receiver (or an admin) drives it with one
//! of three actions; [`apply_action`] computes the resulting state without
//! touching storage so the transition table can be tested in isolation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::notification::NotificationType;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    /// Reached only through a completion flow outside the request engine.
    Done,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Accepted,
        RequestStatus::Rejected,
        RequestStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Done => "done",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown request status '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Read,
    Accept,
    Reject,
}

impl RequestAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestAction::Read => "read",
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
        }
    }
}

impl FromStr for RequestAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(RequestAction::Read),
            "accept" => Ok(RequestAction::Accept),
            "reject" => Ok(RequestAction::Reject),
            other => Err(format!("Invalid action '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing scope
// ---------------------------------------------------------------------------

/// Which side of the exchange a listing is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Requests where the caller is the receiver.
    Incoming,
    /// Requests where the caller is the sender.
    Outgoing,
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Outcome of applying an action to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: RequestStatus,
    pub is_read: bool,
    /// Both parties receive the counterpart's skill.
    pub transfers_skills: bool,
    pub notification: Option<NotificationType>,
}

/// Compute the state a request moves to under `action`.
///
/// Every action marks the request read. `reject` toggles: a pending request
/// becomes rejected, and a request in any other status goes back to pending.
pub fn apply_action(current: RequestStatus, action: RequestAction) -> Transition {
    match action {
        RequestAction::Read => Transition {
            status: current,
            is_read: true,
            transfers_skills: false,
            notification: None,
        },
        RequestAction::Accept => Transition {
            status: RequestStatus::Accepted,
            is_read: true,
            transfers_skills: true,
            notification: Some(NotificationType::AcceptedRequest),
        },
        RequestAction::Reject => Transition {
            status: if current == RequestStatus::Pending {
                RequestStatus::Rejected
            } else {
                RequestStatus::Pending
            },
            is_read: true,
            transfers_skills: false,
            notification: Some(NotificationType::DeclinedRequest),
        },
    }
}
