//! Tests for the shared issue / pull request message template.

use super::*;

#[test]
fn test_issue_with_title_and_no_message() {
    let text = EventMessage::issue("john", "opened", 7)
        .with_title(Some("Bug X"))
        .render();

    assert_eq!(text, "john opened [issue #7 Bug X](None).");
}

#[test]
fn test_issue_with_message_uses_colon_and_quote_block() {
    let text = EventMessage::issue("john", "opened", 7)
        .with_title(Some("Bug X"))
        .with_message(Some("steps..."))
        .render();

    assert_eq!(
        text,
        "john opened [issue #7 Bug X](None):\n\n~~~ quote\nsteps...\n~~~"
    );
}

#[test]
fn test_empty_message_is_treated_as_absent() {
    let text = EventMessage::issue("john", "opened", 7)
        .with_title(Some("Bug X"))
        .with_message(Some(""))
        .render();

    assert_eq!(text, "john opened [issue #7 Bug X](None).");
}

#[test]
fn test_title_ending_in_punctuation_gets_no_extra_period() {
    let text = EventMessage::issue("john", "opened", 3)
        .with_title(Some("Why is this broken?"))
        .render();

    assert_eq!(text, "john opened [issue #3 Why is this broken?](None)");
}

#[test]
fn test_pull_request_with_branches() {
    let text = EventMessage::pull_request("john", "opened", 1)
        .with_branches("feature", "master")
        .render();

    assert_eq!(text, "john opened [PR #1](None) from `feature` to `master`.");
}

#[test]
fn test_branches_force_punctuation_even_after_punctuated_title() {
    let text = EventMessage::pull_request("john", "opened", 1)
        .with_title(Some("Ready!"))
        .with_branches("feature", "master")
        .render();

    assert_eq!(
        text,
        "john opened [PR #1 Ready!](None) from `feature` to `master`."
    );
}

#[test]
fn test_empty_branch_name_omits_branch_info() {
    let text = EventMessage::pull_request("john", "opened", 1)
        .with_branches("", "master")
        .render();

    assert_eq!(text, "john opened [PR #1](None).");
}

#[test]
fn test_real_url_is_rendered() {
    let mut message = EventMessage::pull_request("john", "merged", 4);
    message.url = Some("http://localhost:3000/john/try-git/pulls/4");

    assert_eq!(
        message.render(),
        "john merged [PR #4](http://localhost:3000/john/try-git/pulls/4)."
    );
}

#[test]
fn test_message_content_is_quoted_verbatim() {
    let text = EventMessage::issue("john", "opened", 7)
        .with_message(Some("line\n\n"))
        .render();

    assert_eq!(text, "john opened [issue #7](None):\n\n~~~ quote\nline\n\n\n~~~");
}
