//! Jira Cloud resources reached through the Atlassian API gateway.

pub mod adf;
pub mod client;
pub mod mentions;
pub mod types;

pub use adf::{AdfNode, MentionAttrs, RichText};
pub use client::JiraClient;
pub use mentions::{UserData, extract_user_data};
pub use types::{
    AccessibleResource, Comment, CommentInput, CommentPage, Issue, IssueFields, NewIssue, UserRef,
};
