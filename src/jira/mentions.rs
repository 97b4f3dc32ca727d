use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::adf::{AdfNode, RichText};
use super::types::Issue;

static PLAIN_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([\w.\-]+)").unwrap_or_else(|e| panic!("invalid mention pattern: {}", e))
});

/// People involved in an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    /// De-duplicated, in sorted order
    pub mentions: Vec<String>,
}

/// Collects the assignee, the reporter and every mention found in the
/// description and the comments of `issue`.
pub fn extract_user_data(issue: &Issue) -> UserData {
    let fields = &issue.fields;
    let mut mentions = BTreeSet::new();

    if let Some(description) = &fields.description {
        collect_mentions(description, &mut mentions);
    }
    if let Some(page) = &fields.comment {
        for body in page.comments.iter().filter_map(|c| c.body.as_ref()) {
            collect_mentions(body, &mut mentions);
        }
    }

    UserData {
        assignee: fields
            .assignee
            .as_ref()
            .and_then(|u| u.label())
            .map(str::to_string),
        reporter: fields
            .reporter
            .as_ref()
            .and_then(|u| u.label())
            .map(str::to_string),
        mentions: mentions.into_iter().collect(),
    }
}

fn collect_mentions(body: &RichText, mentions: &mut BTreeSet<String>) {
    match body {
        RichText::Plain(text) => {
            mentions.extend(
                PLAIN_MENTION
                    .captures_iter(text)
                    .map(|caps| caps[1].to_string()),
            );
        }
        RichText::Document(root) => {
            root.walk(&mut |node| match node {
                AdfNode::Mention { attrs, .. } => {
                    if let Some(text) = &attrs.text {
                        mentions.insert(text.clone());
                    }
                }
                AdfNode::Unknown(value) => collect_value_mentions(value, mentions),
                // attrs that did not fit MentionAttrs, e.g. a numeric id
                AdfNode::Container {
                    kind,
                    attrs: Some(attrs),
                    ..
                } if kind == "mention" => {
                    if let Some(text) = attrs.get("text").and_then(Value::as_str) {
                        mentions.insert(text.to_string());
                    }
                }
                AdfNode::Container {
                    content: None,
                    extra,
                    ..
                } => {
                    if let Some(raw) = extra.get("content") {
                        collect_value_mentions(raw, mentions);
                    }
                }
                _ => {}
            });
        }
        RichText::Other(value) => {
            tracing::debug!("Body is not a document or text, scanning raw JSON for mentions");
            collect_value_mentions(value, mentions);
        }
    }
}

// Untyped walk over arbitrary JSON, for bodies that do not parse as a tree
fn collect_value_mentions(value: &Value, mentions: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("mention")
                && let Some(text) = map
                    .get("attrs")
                    .and_then(|attrs| attrs.get("text"))
                    .and_then(Value::as_str)
            {
                mentions.insert(text.to_string());
            }
            for child in map.values() {
                collect_value_mentions(child, mentions);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_value_mentions(item, mentions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(value: Value) -> Issue {
        Issue::from_value(&value).unwrap()
    }

    #[test]
    fn test_plain_text_mentions() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "assignee": { "displayName": "John Doe" },
                "reporter": { "displayName": "Jane Smith" },
                "description": "Hello @john.doe and @jane.smith"
            }
        })));

        assert_eq!(data.assignee.as_deref(), Some("John Doe"));
        assert_eq!(data.reporter.as_deref(), Some("Jane Smith"));
        assert_eq!(data.mentions, vec!["jane.smith", "john.doe"]);
    }

    #[test]
    fn test_document_mentions_at_any_depth() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{
                        "type": "bulletList",
                        "content": [{
                            "type": "listItem",
                            "content": [{
                                "type": "paragraph",
                                "content": [
                                    { "type": "mention", "attrs": { "id": "1", "text": "@Alice" } }
                                ]
                            }]
                        }]
                    }, {
                        "type": "paragraph",
                        "content": [
                            { "type": "text", "text": "ask @bob.plain" },
                            { "type": "mention", "attrs": { "id": "2", "text": "@Bob" } }
                        ]
                    }]
                }
            }
        })));

        // text nodes inside a document are not scanned for handles
        assert_eq!(data.mentions, vec!["@Alice", "@Bob"]);
    }

    #[test]
    fn test_comment_mentions_are_unioned() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "description": "cc @carol",
                "comment": {
                    "comments": [
                        { "body": "thanks @carol, @dave-x" },
                        { "body": {
                            "type": "doc",
                            "version": 1,
                            "content": [{
                                "type": "paragraph",
                                "content": [
                                    { "type": "mention", "attrs": { "id": "9", "text": "@Erin" } }
                                ]
                            }]
                        }},
                        { "id": "3" }
                    ]
                }
            }
        })));

        assert_eq!(data.mentions, vec!["@Erin", "carol", "dave-x"]);
    }

    #[test]
    fn test_name_used_when_display_name_missing() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "assignee": { "name": "jdoe" },
                "reporter": null
            }
        })));

        assert_eq!(data.assignee.as_deref(), Some("jdoe"));
        assert_eq!(data.reporter, None);
        assert!(data.mentions.is_empty());
    }

    #[test]
    fn test_mention_without_text_is_skipped() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [{
                        "type": "paragraph",
                        "content": [{ "type": "mention", "attrs": { "id": "7" } }]
                    }]
                }
            }
        })));

        assert!(data.mentions.is_empty());
    }

    #[test]
    fn test_malformed_nodes_keep_sibling_mentions() {
        let data = extract_user_data(&issue(json!({
            "fields": {
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        null,
                        { "type": "paragraph", "content": { "type": "mention", "attrs": { "text": "@Loose" } } },
                        {
                            "type": "paragraph",
                            "content": [
                                { "type": "mention", "attrs": { "id": "1", "text": "@Alice" } },
                                { "type": "mention", "attrs": { "id": 42, "text": "@Numeric" } },
                                [{ "type": "mention", "attrs": { "text": "@Nested" } }]
                            ]
                        }
                    ]
                },
                "comment": {
                    "comments": [
                        { "body": [{ "type": "mention", "attrs": { "text": "@Raw" } }] }
                    ]
                }
            }
        })));

        assert_eq!(data.mentions, vec!["@Alice", "@Loose", "@Nested", "@Numeric", "@Raw"]);
    }

    #[test]
    fn test_issue_without_people() {
        assert_eq!(extract_user_data(&Issue::default()), UserData::default());
    }
}
