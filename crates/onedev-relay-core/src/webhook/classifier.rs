//! Maps the Onedev `@class` discriminator to a supported [`EventKind`].
//!
//! Onedev serializes its server-side event objects directly, tagging each
//! body with the fully-qualified Java class name of the event under the
//! root `@class` key. Only four classes are understood; everything else is
//! reported as [`Classification::Unsupported`], which callers surface as an
//! explicit rejection rather than a formatting failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Root key holding the event class name
pub const DISCRIMINATOR_KEY: &str = "@class";

/// Discriminator values and the event kinds they map to.
const EVENT_CLASSES: [(&str, EventKind); 4] = [
    (
        "io.onedev.server.event.issue.IssueOpened",
        EventKind::IssueOpened,
    ),
    (
        "io.onedev.server.event.issue.IssueChanged",
        EventKind::IssueChanged,
    ),
    (
        "io.onedev.server.event.pullrequest.PullRequestOpened",
        EventKind::PullRequestOpened,
    ),
    (
        "io.onedev.server.event.pullrequest.PullRequestChanged",
        EventKind::PullRequestChanged,
    ),
];

/// Onedev events that can be turned into a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    IssueOpened,
    IssueChanged,
    PullRequestOpened,
    PullRequestChanged,
}

impl EventKind {
    /// Every supported kind, in declaration order
    pub const ALL: [EventKind; 4] = [
        Self::IssueOpened,
        Self::IssueChanged,
        Self::PullRequestOpened,
        Self::PullRequestChanged,
    ];

    /// Event name passed to the delivery collaborator as metadata
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IssueOpened => "issue_opened",
            Self::IssueChanged => "issue_changed",
            Self::PullRequestOpened => "pull_request_opened",
            Self::PullRequestChanged => "pull_request_changed",
        }
    }

    /// Onedev class name that identifies this kind
    pub fn discriminator(&self) -> &'static str {
        EVENT_CLASSES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(class, _)| *class)
            .unwrap_or_default()
    }

    /// Whether the event concerns an issue (as opposed to a pull request)
    pub fn is_issue(&self) -> bool {
        matches!(self, Self::IssueOpened | Self::IssueChanged)
    }

    /// Action verb used in rendered issue messages
    pub fn issue_action(&self) -> Option<&'static str> {
        match self {
            Self::IssueOpened => Some("opened"),
            Self::IssueChanged => Some("changed"),
            Self::PullRequestOpened | Self::PullRequestChanged => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event kind '{0}'; expected one of issue_opened, issue_changed, pull_request_opened, pull_request_changed")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Result of inspecting a payload's discriminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Supported(EventKind),
    /// No mapping exists. `discriminator` is `None` when `@class` is absent
    /// or not a string.
    Unsupported { discriminator: Option<String> },
}

impl Classification {
    /// The supported kind, if any
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::Supported(kind) => Some(*kind),
            Self::Unsupported { .. } => None,
        }
    }
}

/// Classify a payload by its `@class` discriminator.
///
/// Pure function of the payload; the match is exact and case-sensitive.
pub fn classify(payload: &Value) -> Classification {
    let discriminator = payload.get(DISCRIMINATOR_KEY).and_then(Value::as_str);

    match discriminator.and_then(kind_for_discriminator) {
        Some(kind) => Classification::Supported(kind),
        None => Classification::Unsupported {
            discriminator: discriminator.map(str::to_string),
        },
    }
}

/// Look up the event kind for a raw discriminator value
pub fn kind_for_discriminator(discriminator: &str) -> Option<EventKind> {
    EVENT_CLASSES
        .iter()
        .find(|(class, _)| *class == discriminator)
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
