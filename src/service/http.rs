//! `reqwest` implementation of [`BoardService`] and [`GroupService`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use super::{
    BoardService, BoardSnapshot, ColumnUpdate, GroupService, MoveTask, NewColumn, NewTask,
    TaskUpdate,
};
use crate::board::models::{ColumnMeta, Comment, Member, Task};
use crate::config::ApiConfig;
use crate::errors::ServiceError;

/// REST client for the board and group services.
#[derive(Debug, Clone)]
pub struct HttpBoardService {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBoardService {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid base URL '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!("Base URL '{}' cannot carry a path", base_url).into());
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ServiceError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, ServiceError> {
        Self::new(
            &api.base_url,
            api.token.clone(),
            Duration::from_secs(api.timeout_secs),
        )
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(Url, reqwest::Response), ServiceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(segments);
        debug!(%method, %url, "board service request");

        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| ServiceError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(format!("{} {}", method, url)));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%method, %url, status = status.as_u16(), "board service call rejected");
            return Err(ServiceError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok((url, resp))
    }

    async fn call<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let (url, resp) = self.execute(method, segments, body).await?;
        let bytes = resp.bytes().await.map_err(|source| ServiceError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn call_no_content<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ServiceError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.execute(method, segments, body).await.map(|_| ())
    }
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl BoardService for HttpBoardService {
    async fn get_board(&self, group_id: &str) -> Result<BoardSnapshot, ServiceError> {
        self.call(Method::GET, &["api", "groups", group_id, "board"], NO_BODY)
            .await
    }

    async fn create_column(
        &self,
        group_id: &str,
        column: &NewColumn,
    ) -> Result<ColumnMeta, ServiceError> {
        self.call(
            Method::POST,
            &["api", "groups", group_id, "board", "columns"],
            Some(column),
        )
        .await
    }

    async fn update_column(
        &self,
        column_id: &str,
        update: &ColumnUpdate,
    ) -> Result<ColumnMeta, ServiceError> {
        self.call(Method::PATCH, &["api", "columns", column_id], Some(update))
            .await
    }

    async fn delete_column(&self, column_id: &str) -> Result<(), ServiceError> {
        self.call_no_content(Method::DELETE, &["api", "columns", column_id], NO_BODY)
            .await
    }

    async fn create_task(&self, column_id: &str, task: &NewTask) -> Result<Task, ServiceError> {
        self.call(
            Method::POST,
            &["api", "columns", column_id, "tasks"],
            Some(task),
        )
        .await
    }

    async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task, ServiceError> {
        self.call(Method::PATCH, &["api", "tasks", task_id], Some(update))
            .await
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ServiceError> {
        self.call_no_content(Method::DELETE, &["api", "tasks", task_id], NO_BODY)
            .await
    }

    async fn move_task(&self, task_id: &str, target: &MoveTask) -> Result<(), ServiceError> {
        self.call_no_content(
            Method::PATCH,
            &["api", "tasks", task_id, "move"],
            Some(target),
        )
        .await
    }

    async fn replace_assignees(
        &self,
        task_id: &str,
        assignees: &[String],
    ) -> Result<Task, ServiceError> {
        let body = json!({ "assignees": assignees });
        self.call(
            Method::PUT,
            &["api", "tasks", task_id, "assignees"],
            Some(&body),
        )
        .await
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError> {
        self.call(
            Method::GET,
            &["api", "tasks", task_id, "comments"],
            NO_BODY,
        )
        .await
    }

    async fn create_comment(&self, task_id: &str, text: &str) -> Result<Comment, ServiceError> {
        let body = json!({ "text": text });
        self.call(
            Method::POST,
            &["api", "tasks", task_id, "comments"],
            Some(&body),
        )
        .await
    }

    async fn update_comment(
        &self,
        task_id: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<Comment, ServiceError> {
        let body = json!({ "text": text });
        self.call(
            Method::PATCH,
            &["api", "tasks", task_id, "comments", comment_id],
            Some(&body),
        )
        .await
    }

    async fn delete_comment(&self, task_id: &str, comment_id: &str) -> Result<(), ServiceError> {
        self.call_no_content(
            Method::DELETE,
            &["api", "tasks", task_id, "comments", comment_id],
            NO_BODY,
        )
        .await
    }
}

#[async_trait]
impl GroupService for HttpBoardService {
    async fn list_members(&self, group_id: &str) -> Result<Vec<Member>, ServiceError> {
        self.call(Method::GET, &["api", "groups", group_id, "members"], NO_BODY)
            .await
    }
}
