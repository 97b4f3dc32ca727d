use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::auth::AuthClient;
use crate::cache;
use crate::config::Config;
use crate::errors::AppError;
use crate::jira::{CommentInput, Issue, JiraClient, NewIssue, extract_user_data};
use crate::token_store::TokenStore;

/// jira-3lo - Jira Cloud client using OAuth 2.0 (3LO)
#[derive(Parser)]
#[command(name = "jira-3lo")]
#[command(about = "Authorize against Atlassian and work with Jira Cloud issues", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the config file)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Print the consent URL to visit in a browser
    AuthorizeUrl {
        /// Opaque value echoed back to the redirect URI
        #[arg(short, long, default_value = "jira-3lo")]
        state: String,
    },

    /// Exchange an authorization code and cache the token
    Login {
        #[arg(long)]
        code: String,
    },

    /// Print a valid access token, refreshing it if needed
    Token,

    /// Remove the cached token
    Logout,

    /// List the sites the token can access
    Resources,

    /// List projects
    Projects,

    /// Manage issues
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Manage comments
    #[command(subcommand)]
    Comment(CommentCommands),
}

#[derive(Subcommand, Clone)]
pub enum IssueCommands {
    /// Create an issue
    Create(CreateIssueArgs),

    /// Show an issue
    Get { issue: String },

    /// Update an issue with a JSON payload
    Update {
        issue: String,

        /// JSON payload, e.g. '{"fields":{"summary":"New title"}}'
        #[arg(long)]
        payload: String,
    },

    /// Delete an issue
    Delete { issue: String },

    /// Search issues of a project
    List {
        #[arg(short, long)]
        project: String,

        /// JQL query (default: project=<PROJECT>)
        #[arg(long)]
        jql: Option<String>,
    },

    /// Show the assignee, the reporter and the mentioned users of an issue
    Users { issue: String },
}

#[derive(Args, Clone)]
pub struct CreateIssueArgs {
    /// Project key
    #[arg(short, long, required_unless_present = "payload")]
    pub project: Option<String>,

    #[arg(short, long, required_unless_present = "payload")]
    pub summary: Option<String>,

    #[arg(long, default_value = "Task")]
    pub issue_type: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Raw JSON payload, sent as is
    #[arg(long, conflicts_with_all = ["project", "summary", "description"])]
    pub payload: Option<String>,
}

#[derive(Subcommand, Clone)]
pub enum CommentCommands {
    /// Add a comment to an issue
    Add {
        issue: String,

        /// Comment text
        body: String,

        /// Treat BODY as an ADF document in JSON
        #[arg(long)]
        adf: bool,
    },

    /// List the comments of an issue
    List { issue: String },

    /// React to a comment (not supported by Jira Cloud)
    React { comment_id: String, reaction: String },
}

/// Runs one command against the configured services.
pub async fn run(command: Commands, config: &Config) -> Result<(), AppError> {
    match command {
        Commands::AuthorizeUrl { state } => {
            config.oauth.validate()?;
            let url = config
                .oauth
                .authorization_url(&state)
                .map_err(|e| AppError::Generic {
                    message: format!("Invalid auth_base_url: {}", e),
                })?;
            println!("{}", url);
        }
        Commands::Login { code } => {
            let auth = build_auth_client(config).await?;
            auth.get_token(Some(&code)).await?;
            println!("Login successful");
        }
        Commands::Token => {
            let auth = build_auth_client(config).await?;
            println!("{}", auth.get_token(None).await?);
        }
        Commands::Logout => {
            let auth = build_auth_client(config).await?;
            auth.logout().await?;
            println!("Logged out");
        }
        Commands::Resources => {
            let mut jira = build_jira_client(config).await?;
            print_json(&jira.accessible_resources().await?)?;
        }
        Commands::Projects => {
            let mut jira = build_jira_client(config).await?;
            print_json(&jira.list_projects().await?)?;
        }
        Commands::Issue(command) => run_issue(command, config).await?,
        Commands::Comment(command) => run_comment(command, config).await?,
    }

    Ok(())
}

async fn run_issue(command: IssueCommands, config: &Config) -> Result<(), AppError> {
    let mut jira = build_jira_client(config).await?;

    match command {
        IssueCommands::Create(args) => {
            let payload = match args.payload {
                Some(raw) => parse_json(&raw)?,
                None => {
                    let mut issue = NewIssue::new(
                        args.project.unwrap_or_default(),
                        args.summary.unwrap_or_default(),
                    )
                    .issue_type(args.issue_type);
                    if let Some(description) = args.description {
                        issue = issue.description(description);
                    }
                    issue.into_payload()
                }
            };
            print_json(&jira.create_issue(&payload).await?)?;
        }
        IssueCommands::Get { issue } => print_json(&jira.get_issue(&issue).await?)?,
        IssueCommands::Update { issue, payload } => {
            let updated = jira.update_issue(&issue, &parse_json(&payload)?).await?;
            print_json(&serde_json::json!({ "issue": issue, "updated": updated }))?;
        }
        IssueCommands::Delete { issue } => {
            let deleted = jira.delete_issue(&issue).await?;
            print_json(&serde_json::json!({ "issue": issue, "deleted": deleted }))?;
        }
        IssueCommands::List { project, jql } => {
            print_json(&jira.list_issues(&project, jql.as_deref()).await?)?
        }
        IssueCommands::Users { issue } => {
            let raw = jira.get_issue(&issue).await?;
            let issue = Issue::from_value(&raw).map_err(|e| AppError::Generic {
                message: format!("Unexpected issue payload: {}", e),
            })?;
            print_json(&extract_user_data(&issue))?;
        }
    }

    Ok(())
}

async fn run_comment(command: CommentCommands, config: &Config) -> Result<(), AppError> {
    match command {
        CommentCommands::Add { issue, body, adf } => {
            let input = if adf {
                CommentInput::Document(parse_json(&body)?)
            } else {
                CommentInput::Text(body)
            };
            let mut jira = build_jira_client(config).await?;
            print_json(&jira.add_comment(&issue, input).await?)?;
        }
        CommentCommands::List { issue } => {
            let mut jira = build_jira_client(config).await?;
            print_json(&jira.list_comments(&issue).await?)?;
        }
        CommentCommands::React {
            comment_id,
            reaction,
        } => {
            let jira = build_jira_client(config).await?;
            jira.react_to_comment(&comment_id, &reaction)?;
        }
    }

    Ok(())
}

async fn build_auth_client(config: &Config) -> Result<AuthClient, AppError> {
    let cache = cache::from_config(&config.cache).await?;
    let store = TokenStore::new(cache, config.cache.key.clone())
        .with_retention(config.cache.retention_secs);
    Ok(AuthClient::new(config.oauth.clone(), store)?)
}

async fn build_jira_client(config: &Config) -> Result<JiraClient, AppError> {
    Ok(JiraClient::new(build_auth_client(config).await?))
}

fn parse_json(raw: &str) -> Result<Value, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::Generic {
        message: format!("Invalid JSON: {}", e),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| AppError::Generic {
        message: format!("Failed to format output: {}", e),
    })?;
    println!("{}", output);
    Ok(())
}
