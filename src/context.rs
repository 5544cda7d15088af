use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, WebhookError};

/// Stand-in for a repository owner or name the webhook did not carry.
pub const UNTITLED: &str = "untitled";

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    WorkflowRun,
}

impl EventName {
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::WorkflowRun => "workflow_run",
        }
    }
}

/// Raw `workflow_run` webhook document, kept as received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WorkflowRunPayload(Map<String, Value>);

impl WorkflowRunPayload {
    pub fn workflow_run(&self) -> &Value {
        self.0.get("workflow_run").unwrap_or(&NULL)
    }

    pub fn action(&self) -> Option<&str> {
        self.0.get("action").and_then(Value::as_str)
    }

    pub fn repository_owner(&self) -> Option<&str> {
        self.0
            .get("repository")
            .and_then(|repository| repository.get("owner"))
            .and_then(|owner| owner.get("login"))
            .and_then(Value::as_str)
    }

    pub fn repository_name(&self) -> Option<&str> {
        self.0
            .get("repository")
            .and_then(|repository| repository.get("name"))
            .and_then(Value::as_str)
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

/// Closed set of supported webhook kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    WorkflowRun(WorkflowRunPayload),
}

impl WebhookEvent {
    pub fn classify(payload: Value) -> Result<Self> {
        match payload {
            Value::Object(map) if map.contains_key("workflow_run") => {
                Ok(WebhookEvent::WorkflowRun(WorkflowRunPayload(map)))
            }
            _ => Err(WebhookError::UnsupportedEvent("Unsupported event type".to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repo {
    pub owner: String,
    pub repo: String,
}

/// Which repository, which event kind, and the raw payload.
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubContext {
    event_name: EventName,
    payload: WorkflowRunPayload,
    repo: Repo,
}

impl GitHubContext {
    pub fn from_payload(payload: Value) -> Result<Self> {
        WebhookEvent::classify(payload).map(GitHubContext::from_event)
    }

    pub fn from_event(event: WebhookEvent) -> Self {
        match event {
            WebhookEvent::WorkflowRun(payload) => {
                let repo = Repo {
                    owner: payload.repository_owner().unwrap_or(UNTITLED).to_owned(),
                    repo: payload.repository_name().unwrap_or(UNTITLED).to_owned(),
                };
                GitHubContext { event_name: EventName::WorkflowRun, payload, repo }
            }
        }
    }

    pub fn event_name(&self) -> EventName {
        self.event_name
    }

    pub fn payload(&self) -> &WorkflowRunPayload {
        &self.payload
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_workflow_run_context() {
        let context = GitHubContext::from_payload(json!({
            "action": "completed",
            "workflow_run": {"id": 42},
            "repository": {"owner": {"login": "acme"}, "name": "widgets"}
        }))
        .unwrap();

        assert_eq!(context.event_name(), EventName::WorkflowRun);
        assert_eq!(context.event_name().as_str(), "workflow_run");
        assert_eq!(context.repo(), &Repo { owner: "acme".to_owned(), repo: "widgets".to_owned() });
        assert_eq!(context.payload().workflow_run()["id"], 42);
        assert_eq!(context.payload().action(), Some("completed"));
    }

    #[test]
    fn missing_repository_falls_back_to_untitled() {
        let context = GitHubContext::from_payload(json!({"workflow_run": {}})).unwrap();
        assert_eq!(context.repo().owner, UNTITLED);
        assert_eq!(context.repo().repo, UNTITLED);
    }

    #[test]
    fn partial_repository_is_tolerated() {
        let context = GitHubContext::from_payload(json!({
            "workflow_run": null,
            "repository": {"owner": null, "name": "widgets"}
        }))
        .unwrap();
        assert_eq!(context.repo().owner, UNTITLED);
        assert_eq!(context.repo().repo, "widgets");
    }

    #[test]
    fn other_payloads_are_unsupported() {
        for payload in vec![json!({"workflow_job": {}}), json!([1, 2]), json!("workflow_run")] {
            match GitHubContext::from_payload(payload) {
                Err(WebhookError::UnsupportedEvent(message)) => assert_eq!(message, "Unsupported event type"),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn serializes_with_event_name() {
        let context = GitHubContext::from_payload(json!({"workflow_run": {}})).unwrap();
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["eventName"], "workflow_run");
        assert_eq!(value["repo"]["owner"], "untitled");
        assert_eq!(value["payload"]["workflow_run"], json!({}));
    }
}
