//! Onedev webhook bodies shared by the core test modules.

use serde_json::{json, Value};

pub fn issue_opened() -> Value {
    json!({
        "@class": "io.onedev.server.event.issue.IssueOpened",
        "date": "2023-03-14T10:12:00Z",
        "user": { "id": 1, "name": "john" },
        "project": { "id": 1, "name": "try-git" },
        "issue": {
            "id": 10,
            "number": 7,
            "title": "Bug X",
            "description": "steps...",
            "state": "Open"
        }
    })
}

pub fn issue_changed(data: Value) -> Value {
    json!({
        "@class": "io.onedev.server.event.issue.IssueChanged",
        "date": "2023-03-14T11:40:00Z",
        "user": { "id": 1, "name": "john" },
        "project": { "id": 1, "name": "try-git" },
        "issue": {
            "id": 10,
            "number": 7,
            "title": "Bug X",
            "description": "steps...",
            "state": "Closed"
        },
        "change": {
            "user": { "id": 1, "name": "john" },
            "data": data
        }
    })
}

pub fn state_change(old_state: &str, new_state: &str) -> Value {
    json!({
        "@type": "IssueStateChangeData",
        "oldState": old_state,
        "newState": new_state
    })
}

pub fn pull_request(class: &str, activity: &str) -> Value {
    json!({
        "@class": class,
        "date": "2023-03-14T12:00:00Z",
        "user": { "id": 1, "name": "john" },
        "project": { "id": 1, "name": "try-git" },
        "request": {
            "id": 4,
            "number": 1,
            "title": "Add feature",
            "sourceBranch": "master",
            "targetBranch": "feature",
            "lastUpdate": { "activity": activity }
        }
    })
}

pub fn pull_request_opened() -> Value {
    pull_request(
        "io.onedev.server.event.pullrequest.PullRequestOpened",
        "opened",
    )
}

/// Remove the value at a dot-separated path, leaving its parent in place
pub fn remove_path(value: &mut Value, path: &str) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };
    let parent = segments
        .into_iter()
        .try_fold(value, |current, key| current.get_mut(key));
    if let Some(Value::Object(map)) = parent {
        map.remove(last);
    }
}

/// Replace the value at a dot-separated path
pub fn set_path(value: &mut Value, path: &str, new_value: Value) {
    let target = path
        .split('.')
        .try_fold(value, |current, key| current.get_mut(key));
    if let Some(slot) = target {
        *slot = new_value;
    }
}
