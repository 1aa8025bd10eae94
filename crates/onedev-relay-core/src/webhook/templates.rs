//! Shared message templates for issue and pull request notifications.
//!
//! These mirror the chat platform's common git-integration wording so that
//! Onedev notifications read the same as those from other forges:
//!
//! ```text
//! {user} {action} [{type} #{number} {title}]({url}) from `{target}` to `{base}`:
//!
//! ~~~ quote
//! {message}
//! ~~~
//! ```
//!
//! When no URL is known the link target is rendered as the literal `None`;
//! [`repair_placeholder_links`](super::link_repair::repair_placeholder_links)
//! turns those links back into plain text.

use std::fmt::Write;

/// Subject type label for issues
pub const ISSUE_TYPE: &str = "issue";

/// Subject type label for pull requests
pub const PULL_REQUEST_TYPE: &str = "PR";

/// Link target rendered when the source system supplies no URL
pub const MISSING_URL: &str = "None";

/// Inputs for a single issue or pull request notification.
///
/// `target_branch` is the branch being merged and `base_branch` the branch
/// receiving the merge; the rendered text reads "from target to base".
#[derive(Debug, Clone, Default)]
pub struct EventMessage<'a> {
    pub user_name: &'a str,
    pub action: &'a str,
    pub subject_type: &'a str,
    pub url: Option<&'a str>,
    pub number: Option<i64>,
    pub title: Option<&'a str>,
    pub target_branch: Option<&'a str>,
    pub base_branch: Option<&'a str>,
    pub message: Option<&'a str>,
}

impl<'a> EventMessage<'a> {
    /// Message about an issue
    pub fn issue(user_name: &'a str, action: &'a str, number: i64) -> Self {
        Self {
            user_name,
            action,
            subject_type: ISSUE_TYPE,
            number: Some(number),
            ..Default::default()
        }
    }

    /// Message about a pull request
    pub fn pull_request(user_name: &'a str, action: &'a str, number: i64) -> Self {
        Self {
            user_name,
            action,
            subject_type: PULL_REQUEST_TYPE,
            number: Some(number),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: Option<&'a str>) -> Self {
        self.title = title;
        self
    }

    pub fn with_branches(mut self, target_branch: &'a str, base_branch: &'a str) -> Self {
        self.target_branch = Some(target_branch);
        self.base_branch = Some(base_branch);
        self
    }

    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    /// Render the notification text
    pub fn render(&self) -> String {
        let mut out = format!("{} {} [{}", self.user_name, self.action, self.subject_type);
        if let Some(number) = self.number {
            let _ = write!(out, " #{number}");
        }
        if let Some(title) = self.title {
            let _ = write!(out, " {title}");
        }
        let _ = write!(out, "]({})", self.url.unwrap_or(MISSING_URL));

        let branches = match (self.target_branch, self.base_branch) {
            (Some(target), Some(base)) if !target.is_empty() && !base.is_empty() => {
                let _ = write!(out, " from `{target}` to `{base}`");
                true
            }
            _ => false,
        };

        let message = self.message.filter(|m| !m.is_empty());

        // A title that already ends in punctuation closes the sentence itself.
        let title_punctuated = self
            .title
            .and_then(|t| t.chars().last())
            .is_some_and(|c| c.is_ascii_punctuation());
        if branches || !title_punctuated {
            out.push(if message.is_some() { ':' } else { '.' });
        }

        if let Some(message) = message {
            let _ = write!(out, "\n\n~~~ quote\n{message}\n~~~");
        }

        out.truncate(out.trim_end().len());
        out
    }
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
