//! Atlassian Document Format (ADF) rich text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A description or comment body as returned by Jira.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    Plain(String),
    Document(AdfNode),
    Other(Value),
}

impl RichText {
    /// Minimal document holding one paragraph with one text node.
    pub fn document_from_text(text: &str) -> Value {
        json!({
            "type": "doc",
            "version": 1,
            "content": [
                {
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": text }
                    ]
                }
            ]
        })
    }
}

/// Attributes of a `mention` node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentionAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display handle, e.g. `@Jane Smith`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        rename = "accessLevel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<MentionAttrs> for Value {
    fn from(attrs: MentionAttrs) -> Self {
        let mut map = attrs.extra;
        if let Some(id) = attrs.id {
            map.insert("id".to_string(), Value::String(id));
        }
        if let Some(text) = attrs.text {
            map.insert("text".to_string(), Value::String(text));
        }
        if let Some(access_level) = attrs.access_level {
            map.insert("accessLevel".to_string(), Value::String(access_level));
        }
        Value::Object(map)
    }
}

/// One node of an ADF tree.
///
/// Properties the variant does not model are kept in `extra`, so a parsed
/// tree serializes back to the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Value")]
pub enum AdfNode {
    Text {
        text: String,
        marks: Option<Value>,
        extra: Map<String, Value>,
    },
    Mention {
        attrs: MentionAttrs,
        extra: Map<String, Value>,
    },
    /// Any other node type (`doc`, `paragraph`, `bulletList`, `hardBreak`, ...)
    Container {
        /// Empty when the node has no string `type`
        kind: String,
        attrs: Option<Value>,
        /// `None` when the node has no `content` array
        content: Option<Vec<AdfNode>>,
        extra: Map<String, Value>,
    },
    /// A `content` entry that is not a node object
    Unknown(Value),
}

impl AdfNode {
    /// Parses one `content` entry.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => AdfNode::from(map),
            other => AdfNode::Unknown(other),
        }
    }

    /// Node type as it appears in the `type` property.
    pub fn kind(&self) -> &str {
        match self {
            AdfNode::Text { .. } => "text",
            AdfNode::Mention { .. } => "mention",
            AdfNode::Container { kind, .. } => kind,
            AdfNode::Unknown(_) => "",
        }
    }

    pub fn children(&self) -> &[AdfNode] {
        match self {
            AdfNode::Container {
                content: Some(content),
                ..
            } => content,
            _ => &[],
        }
    }

    /// Calls `visit` on this node and every descendant, depth first.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a AdfNode),
    {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl From<Map<String, Value>> for AdfNode {
    fn from(mut map: Map<String, Value>) -> Self {
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind == "text"
            && let Some(Value::String(text)) = map.get("text").cloned()
        {
            map.remove("type");
            map.remove("text");
            let marks = map.remove("marks");
            return AdfNode::Text {
                text,
                marks,
                extra: map,
            };
        }

        if kind == "mention"
            && let Some(attrs) = map
                .get("attrs")
                .and_then(|attrs| MentionAttrs::deserialize(attrs).ok())
        {
            map.remove("type");
            map.remove("attrs");
            return AdfNode::Mention { attrs, extra: map };
        }

        if map.get("type").is_some_and(Value::is_string) {
            map.remove("type");
        }
        let attrs = map.remove("attrs");
        // a non-array `content` stays in `extra` untouched
        let content = match map.remove("content") {
            Some(Value::Array(items)) => Some(items.into_iter().map(AdfNode::from_value).collect()),
            Some(other) => {
                map.insert("content".to_string(), other);
                None
            }
            None => None,
        };

        AdfNode::Container {
            kind,
            attrs,
            content,
            extra: map,
        }
    }
}

impl From<AdfNode> for Value {
    fn from(node: AdfNode) -> Self {
        let map = match node {
            AdfNode::Unknown(value) => return value,
            AdfNode::Text {
                text,
                marks,
                mut extra,
            } => {
                extra.insert("type".to_string(), Value::from("text"));
                extra.insert("text".to_string(), Value::String(text));
                if let Some(marks) = marks {
                    extra.insert("marks".to_string(), marks);
                }
                extra
            }
            AdfNode::Mention { attrs, mut extra } => {
                extra.insert("type".to_string(), Value::from("mention"));
                extra.insert("attrs".to_string(), Value::from(attrs));
                extra
            }
            AdfNode::Container {
                kind,
                attrs,
                content,
                mut extra,
            } => {
                if !kind.is_empty() {
                    extra.insert("type".to_string(), Value::String(kind));
                }
                if let Some(attrs) = attrs {
                    extra.insert("attrs".to_string(), attrs);
                }
                if let Some(content) = content {
                    extra.insert(
                        "content".to_string(),
                        Value::Array(content.into_iter().map(Value::from).collect()),
                    );
                }
                extra
            }
        };
        Value::Object(map)
    }
}
