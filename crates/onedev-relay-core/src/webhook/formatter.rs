//! Renders the topic and body for each supported Onedev event.
//!
//! Every field is read through [`Payload`] accessors at a fixed path. A
//! required field that is missing or of the wrong type aborts formatting with
//! a [`FieldExtractionError`]; no partial message is ever produced. Optional
//! fields (the issue description) render as empty content.
//!
//! Topics follow the chat platform's forge conventions:
//!
//! | Event kind          | Topic                                   |
//! |---------------------|-----------------------------------------|
//! | issue opened/changed| `{project} / issue #{number} {title}`   |
//! | PR opened/changed   | `{project} / PR #{number} {title}`      |
//!
//! A non-empty [`FormatOptions::topic_override`] replaces the computed topic.

use crate::webhook::{
    classifier::EventKind,
    link_repair::repair_placeholder_links,
    payload::{FieldExtractionError, Payload},
    templates::EventMessage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// ============================================================================
// Field paths
// ============================================================================

pub const PROJECT_NAME: &str = "project.name";
pub const USER_NAME: &str = "user.name";

pub const ISSUE_NUMBER: &str = "issue.number";
pub const ISSUE_TITLE: &str = "issue.title";
pub const ISSUE_DESCRIPTION: &str = "issue.description";

pub const CHANGE_DATA_TYPE: &str = "change.data.@type";
pub const CHANGE_OLD_STATE: &str = "change.data.oldState";
pub const CHANGE_NEW_STATE: &str = "change.data.newState";

pub const REQUEST_NUMBER: &str = "request.number";
pub const REQUEST_TITLE: &str = "request.title";
pub const REQUEST_ACTIVITY: &str = "request.lastUpdate.activity";

/// `change.data.@type` of an issue state transition
pub const STATE_CHANGE_TYPE: &str = "IssueStateChangeData";

/// Which Onedev request fields fill the template's branch slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchFieldMapping {
    /// Payload path rendered as the template's `target_branch` (the "from" branch)
    pub target_branch: &'static str,
    /// Payload path rendered as the template's `base_branch` (the "to" branch)
    pub base_branch: &'static str,
}

/// Onedev names branches from the request's point of view: `sourceBranch`
/// is merged into `targetBranch`. The shared template calls the merged
/// branch `target_branch` and the receiving one `base_branch`, so the names
/// cross over here. The rendered sentence reads
/// "from `{sourceBranch}` to `{targetBranch}`".
pub const BRANCH_FIELDS: BranchFieldMapping = BranchFieldMapping {
    target_branch: "request.sourceBranch",
    base_branch: "request.targetBranch",
};

// ============================================================================
// Types
// ============================================================================

/// Caller-supplied formatting options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Topic to use instead of the computed one. Empty strings are ignored.
    #[serde(default)]
    pub topic_override: Option<String>,

    /// Include the pull request title in pull request bodies
    #[serde(default)]
    pub include_title: bool,
}

impl FormatOptions {
    fn topic_override(&self) -> Option<&str> {
        self.topic_override.as_deref().filter(|t| !t.is_empty())
    }
}

/// Rendered notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub topic: String,
    pub body: String,
}

/// The change carried by an `IssueChanged` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueChange<'a> {
    StateTransition {
        old_state: &'a str,
        new_state: &'a str,
    },
    /// A change type with no dedicated rendering
    Unrecognized { change_type: &'a str },
}

impl<'a> IssueChange<'a> {
    /// Read the change from an `IssueChanged` payload
    pub fn from_payload(payload: &Payload<'a>) -> Result<Self, FieldExtractionError> {
        match payload.get_str(CHANGE_DATA_TYPE)? {
            STATE_CHANGE_TYPE => Ok(Self::StateTransition {
                old_state: payload.get_str(CHANGE_OLD_STATE)?,
                new_state: payload.get_str(CHANGE_NEW_STATE)?,
            }),
            change_type => Ok(Self::Unrecognized { change_type }),
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Render the notification for an already-classified payload.
///
/// # Errors
///
/// Returns [`FieldExtractionError`] when a required field is absent or has
/// the wrong type. `project.name` is required for every kind, even when the
/// topic is overridden.
pub fn format_event(
    payload: &Value,
    kind: EventKind,
    options: &FormatOptions,
) -> Result<NotificationMessage, FieldExtractionError> {
    let payload = Payload::new(payload);
    let project = payload.get_str(PROJECT_NAME)?;

    let body = match kind.issue_action() {
        Some(action) if kind == EventKind::IssueOpened => {
            format_issue_opened_body(&payload, action)?
        }
        Some(action) => format_issue_changed_body(&payload, action)?,
        None => format_pull_request_body(&payload, options.include_title)?,
    };

    let topic = match options.topic_override() {
        Some(topic) => topic.to_string(),
        None if kind.is_issue() => format_issue_topic(&payload, project)?,
        None => format_pull_request_topic(&payload, project)?,
    };

    debug!(event_kind = %kind, topic = %topic, "Formatted notification");
    Ok(NotificationMessage { topic, body })
}

/// `{project} / issue #{number} {title}`
pub fn format_issue_topic(
    payload: &Payload<'_>,
    project: &str,
) -> Result<String, FieldExtractionError> {
    let number = payload.get_int(ISSUE_NUMBER)?;
    let title = payload.get_str(ISSUE_TITLE)?;
    Ok(format!("{project} / issue #{number} {title}"))
}

/// `{project} / PR #{number} {title}`
pub fn format_pull_request_topic(
    payload: &Payload<'_>,
    project: &str,
) -> Result<String, FieldExtractionError> {
    let number = payload.get_int(REQUEST_NUMBER)?;
    let title = payload.get_str(REQUEST_TITLE)?;
    Ok(format!("{project} / PR #{number} {title}"))
}

fn format_issue_opened_body(
    payload: &Payload<'_>,
    action: &str,
) -> Result<String, FieldExtractionError> {
    let user_name = payload.get_str(USER_NAME)?;
    let number = payload.get_int(ISSUE_NUMBER)?;
    let title = payload.get_str(ISSUE_TITLE)?;
    let description = payload.get_optional_str(ISSUE_DESCRIPTION)?;

    let text = EventMessage::issue(user_name, action, number)
        .with_title(Some(title))
        .with_message(description)
        .render();
    Ok(repair_placeholder_links(&text).into_owned())
}

fn format_issue_changed_body(
    payload: &Payload<'_>,
    action: &str,
) -> Result<String, FieldExtractionError> {
    let user_name = payload.get_str(USER_NAME)?;
    let number = payload.get_int(ISSUE_NUMBER)?;
    let title = payload.get_str(ISSUE_TITLE)?;

    let text = match IssueChange::from_payload(payload)? {
        IssueChange::StateTransition {
            old_state,
            new_state,
        } => format!("{user_name} {action} 'state' from '{old_state}' to '{new_state}'"),
        IssueChange::Unrecognized { change_type } => {
            warn!(
                change_type = %change_type,
                issue_number = number,
                "No rendering for issue change type; sending generic change notice"
            );
            EventMessage::issue(user_name, action, number)
                .with_title(Some(title))
                .render()
        }
    };
    Ok(repair_placeholder_links(&text).into_owned())
}

fn format_pull_request_body(
    payload: &Payload<'_>,
    include_title: bool,
) -> Result<String, FieldExtractionError> {
    let user_name = payload.get_str(USER_NAME)?;
    let action = payload.get_str(REQUEST_ACTIVITY)?;
    let number = payload.get_int(REQUEST_NUMBER)?;
    let target_branch = payload.get_str(BRANCH_FIELDS.target_branch)?;
    let base_branch = payload.get_str(BRANCH_FIELDS.base_branch)?;
    let title = if include_title {
        Some(payload.get_str(REQUEST_TITLE)?)
    } else {
        None
    };

    let text = EventMessage::pull_request(user_name, action, number)
        .with_title(title)
        .with_branches(target_branch, base_branch)
        .render();
    Ok(repair_placeholder_links(&text).into_owned())
}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;
