//! Repair of link markup whose target is the placeholder `None`.
//!
//! The shared message templates always render the subject of an event as a
//! markdown link `[label](url)`. Onedev webhooks carry no URL for the issue
//! or pull request, so the link target materializes as the literal text
//! `None`. This pass rewrites `[label](None)` to plain `label` and leaves
//! every other link untouched.
//!
//! A label is one or more characters other than newline. Brackets inside a
//! label must be balanced, up to two levels deep, so titles such as
//! `[WIP] fix login` repair while a placeholder never swallows a neighbouring
//! well-formed link. Replacement runs until nothing changes, which keeps the
//! transform idempotent when placeholders are nested (`[[a](None)](None)`
//! becomes `a`).

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `[label](None)` where the label may hold balanced `[...]` groups.
const PLACEHOLDER_PATTERN: &str = concat!(
    r"\[(",
    r"(?:[^\[\]\n]",
    r"|\[(?:[^\[\]\n]|\[[^\[\]\n]*\])*\]",
    r")+)\]\(None\)",
);

static PLACEHOLDER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(PLACEHOLDER_PATTERN).expect("placeholder link pattern is valid")
});

/// Replace every `[label](None)` in `text` with `label`.
///
/// Returns the input unchanged (borrowed) when no placeholder is present.
///
/// # Examples
///
/// ```rust
/// use onedev_relay_core::repair_placeholder_links;
///
/// assert_eq!(
///     repair_placeholder_links("john opened [PR #1](None)."),
///     "john opened PR #1."
/// );
/// assert_eq!(
///     repair_placeholder_links("see [docs](https://example.com)"),
///     "see [docs](https://example.com)"
/// );
/// ```
pub fn repair_placeholder_links(text: &str) -> Cow<'_, str> {
    let mut repaired = Cow::Borrowed(text);
    loop {
        let next = match PLACEHOLDER_LINK.replace_all(&repaired, "$1") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match next {
            Some(next) => repaired = Cow::Owned(next),
            None => return repaired,
        }
    }
}

#[cfg(test)]
#[path = "link_repair_tests.rs"]
mod tests;
