use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::adf::RichText;

/// A Jira user reference (`assignee`, `reporter`, comment `author`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserRef {
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRef {
    /// `displayName` when present and non-empty, `name` otherwise.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.name.as_deref().filter(|name| !name.is_empty()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub body: Option<RichText>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `comment` field embedded in an issue.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub assignee: Option<UserRef>,
    #[serde(default)]
    pub reporter: Option<UserRef>,
    #[serde(default)]
    pub description: Option<RichText>,
    #[serde(default)]
    pub comment: Option<CommentPage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read-only typed view of an issue payload.
///
/// The client hands out issues as the JSON Jira sent; parse that into an
/// `Issue` to inspect it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub fields: IssueFields,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Issue::deserialize(value)
    }
}

/// One entry of the accessible-resources discovery response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibleResource {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(rename = "avatarUrl", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProjectPage {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommentList {
    #[serde(default)]
    pub comments: Vec<Value>,
}

/// Body of a new comment.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentInput {
    /// Wrapped into a one-paragraph document before sending
    Text(String),
    /// Sent as is
    Document(Value),
}

impl CommentInput {
    /// Request body for `POST /issue/{id}/comment`.
    pub fn into_request_body(self) -> Value {
        match self {
            CommentInput::Text(text) => json!({ "body": RichText::document_from_text(&text) }),
            CommentInput::Document(document) => json!({ "body": document }),
        }
    }
}

impl From<&str> for CommentInput {
    fn from(text: &str) -> Self {
        CommentInput::Text(text.to_string())
    }
}

impl From<String> for CommentInput {
    fn from(text: String) -> Self {
        CommentInput::Text(text)
    }
}

impl From<Value> for CommentInput {
    fn from(document: Value) -> Self {
        match document {
            Value::String(text) => CommentInput::Text(text),
            other => CommentInput::Document(other),
        }
    }
}

/// Builder for the usual `{"fields": {...}}` create-issue payload.
#[derive(Debug, Clone)]
pub struct NewIssue {
    project_key: String,
    summary: String,
    issue_type: String,
    description: Option<String>,
    extra_fields: Map<String, Value>,
}

impl NewIssue {
    pub fn new(project_key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            summary: summary.into(),
            issue_type: "Task".to_string(),
            description: None,
            extra_fields: Map::new(),
        }
    }

    pub fn issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self
    }

    /// Plain text description, sent as a one-paragraph document
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra_fields.insert(name.into(), value);
        self
    }

    pub fn into_payload(self) -> Value {
        let mut fields = self.extra_fields;
        fields.insert("project".to_string(), json!({ "key": self.project_key }));
        fields.insert("summary".to_string(), Value::String(self.summary));
        fields.insert("issuetype".to_string(), json!({ "name": self.issue_type }));
        if let Some(description) = self.description {
            fields.insert(
                "description".to_string(),
                RichText::document_from_text(&description),
            );
        }
        json!({ "fields": fields })
    }
}
