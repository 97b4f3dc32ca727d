use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::AuthClient;
use crate::errors::{JiraError, Operation};
use crate::jira::types::{
    AccessibleResource, CommentInput, CommentList, ProjectPage, SearchResponse,
};

/// Jira Cloud REST v3 クライアント
pub struct JiraClient {
    auth: AuthClient,
    http: Client,
    cloud_id: Option<String>,
}

impl JiraClient {
    /// 認証クライアントのHTTPクライアントを共有して作成
    pub fn new(auth: AuthClient) -> Self {
        let http = auth.http_client().clone();
        JiraClient {
            auth,
            http,
            cloud_id: None,
        }
    }

    /// 既知のcloud idを使用する（ディスカバリを省略）
    pub fn with_cloud_id(mut self, cloud_id: impl Into<String>) -> Self {
        self.cloud_id = Some(cloud_id.into());
        self
    }

    pub fn cloud_id(&self) -> Option<&str> {
        self.cloud_id.as_deref()
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// アクセス可能なサイト一覧を取得し、未設定ならcloud idを確定する
    pub async fn accessible_resources(&mut self) -> Result<Vec<AccessibleResource>, JiraError> {
        let token = self.access_token(Operation::DiscoverResources).await?;
        self.discover(&token).await
    }

    /// 課題を作成（ペイロードはそのまま送信）
    pub async fn create_issue(&mut self, payload: &Value) -> Result<Value, JiraError> {
        let operation = Operation::CreateIssue;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .post(format!("{}/issue", base))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .json(payload);
        let response = send(operation, request).await?;

        if response.status() == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Jira API 400 Bad Request: {}", body);
            return Err(JiraError::Validation { body });
        }

        let created: Value = decode(operation, ensure_success(operation, response).await?).await?;
        tracing::info!(
            "Created issue {}",
            created.get("key").and_then(serde_json::Value::as_str).unwrap_or("?")
        );
        Ok(created)
    }

    /// 課題を更新。204 No Content のとき true
    pub async fn update_issue(&mut self, issue_id: &str, payload: &Value) -> Result<bool, JiraError> {
        let operation = Operation::UpdateIssue;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .put(format!("{}/issue/{}", base, issue_id))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .json(payload);
        let response = ensure_success(operation, send(operation, request).await?).await?;

        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    /// 課題を削除。204 No Content のとき true
    pub async fn delete_issue(&mut self, issue_id: &str) -> Result<bool, JiraError> {
        let operation = Operation::DeleteIssue;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .delete(format!("{}/issue/{}", base, issue_id))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json");
        let response = ensure_success(operation, send(operation, request).await?).await?;

        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    /// 課題をJiraが返したJSONのまま取得
    pub async fn get_issue(&mut self, issue_id: &str) -> Result<Value, JiraError> {
        let operation = Operation::GetIssue;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .get(format!("{}/issue/{}", base, issue_id))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json");
        let response = ensure_success(operation, send(operation, request).await?).await?;

        decode(operation, response).await
    }

    /// JQLで課題を検索。`jql` が無ければ `project={project_key}`
    pub async fn list_issues(
        &mut self,
        project_key: &str,
        jql: Option<&str>,
    ) -> Result<Vec<Value>, JiraError> {
        let operation = Operation::ListIssues;
        let (token, base) = self.prepare(operation).await?;

        let jql = jql
            .map(str::to_string)
            .unwrap_or_else(|| format!("project={}", project_key));
        tracing::debug!("Searching issues with JQL: {}", jql);

        let request = self
            .http
            .get(format!("{}/search", base))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .query(&[("jql", jql.as_str())]);
        let response = ensure_success(operation, send(operation, request).await?).await?;

        let page: SearchResponse = decode(operation, response).await?;
        Ok(page.issues)
    }

    pub async fn list_projects(&mut self) -> Result<Vec<Value>, JiraError> {
        let operation = Operation::ListProjects;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .get(format!("{}/project/search", base))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json");
        let response = ensure_success(operation, send(operation, request).await?).await?;

        let page: ProjectPage = decode(operation, response).await?;
        Ok(page.values)
    }

    /// コメントを追加。テキストは1段落のドキュメントに包んで送信
    pub async fn add_comment(
        &mut self,
        issue_id: &str,
        comment: impl Into<CommentInput>,
    ) -> Result<Value, JiraError> {
        let operation = Operation::AddComment;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .post(format!("{}/issue/{}/comment", base, issue_id))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json")
            .json(&comment.into().into_request_body());
        let response = ensure_success(operation, send(operation, request).await?).await?;

        decode(operation, response).await
    }

    pub async fn list_comments(&mut self, issue_id: &str) -> Result<Vec<Value>, JiraError> {
        let operation = Operation::ListComments;
        let (token, base) = self.prepare(operation).await?;

        let request = self
            .http
            .get(format!("{}/issue/{}/comment", base, issue_id))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json");
        let response = ensure_success(operation, send(operation, request).await?).await?;

        let list: CommentList = decode(operation, response).await?;
        Ok(list.comments)
    }

    /// Jira Cloud APIはコメントへのリアクションを提供していない
    pub fn react_to_comment(&self, comment_id: &str, reaction: &str) -> Result<(), JiraError> {
        tracing::warn!(
            "Jira Cloud API does not support comment reactions (comment={}, reaction={})",
            comment_id,
            reaction
        );
        Err(JiraError::Unsupported {
            operation: Operation::ReactToComment,
        })
    }

    async fn access_token(&self, operation: Operation) -> Result<String, JiraError> {
        self.auth
            .get_token(None)
            .await
            .map_err(|source| JiraError::Auth { operation, source })
    }

    /// トークンを取得し、REST v3 のベースURLを返す
    async fn prepare(&mut self, operation: Operation) -> Result<(String, String), JiraError> {
        let token = self.access_token(operation).await?;

        if self.cloud_id.is_none() {
            self.discover(&token).await?;
        }
        let cloud_id = self
            .cloud_id
            .as_deref()
            .ok_or_else(|| JiraError::TenantUnresolved {
                reason: "no accessible resources for this token".to_string(),
            })?;

        let base = format!(
            "{}/ex/jira/{}/rest/api/3",
            self.auth.config().api_base_url,
            cloud_id
        );
        Ok((token, base))
    }

    async fn discover(&mut self, token: &str) -> Result<Vec<AccessibleResource>, JiraError> {
        let operation = Operation::DiscoverResources;
        let url = format!(
            "{}/oauth/token/accessible-resources",
            self.auth.config().api_base_url
        );
        tracing::debug!("GET {}", url);

        let request = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/json");
        let response = ensure_success(operation, send(operation, request).await?).await?;

        let text = response
            .text()
            .await
            .map_err(|source| JiraError::Decode { operation, source })?;
        let resources: Vec<AccessibleResource> =
            serde_json::from_str(&text).map_err(|e| JiraError::TenantUnresolved {
                reason: format!("malformed accessible-resources response: {}", e),
            })?;

        if self.cloud_id.is_none()
            && let Some(first) = resources.first()
        {
            tracing::info!("Resolved Jira cloud id {}", first.id);
            self.cloud_id = Some(first.id.clone());
        }

        Ok(resources)
    }
}

async fn send(operation: Operation, request: RequestBuilder) -> Result<Response, JiraError> {
    request.send().await.map_err(|source| {
        tracing::error!("Failed to {}: {}", operation, source);
        JiraError::Request { operation, source }
    })
}

async fn ensure_success(operation: Operation, response: Response) -> Result<Response, JiraError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::error!("Failed to {}: {} {}", operation, status, body);
    Err(JiraError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(operation: Operation, response: Response) -> Result<T, JiraError> {
    response
        .json()
        .await
        .map_err(|source| JiraError::Decode { operation, source })
}
