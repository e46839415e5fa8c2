//! Where submitted comments go

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use super::model::{CommentId, NewComment};
use crate::auth::{AuthError, TokenManager};

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Comment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Comment service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Comment service rejected the mutation: {0}")]
    GraphQl(String),
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn add_comment(&self, comment: NewComment) -> Result<CommentId, CommentError>;
}

const INSERT_COMMENT: &str = r#"mutation AddComment($object: comments_insert_input!) {
  insert_comments_one(object: $object) {
    id
  }
}"#;

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<InsertData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct InsertData {
    insert_comments_one: Option<InsertedRow>,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: CommentId,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Comments stored through the GraphQL API, authorized with the current
/// access token
#[derive(Clone)]
pub struct GraphqlCommentStore {
    endpoint: String,
    client: Client,
    tokens: Arc<TokenManager>,
}

impl GraphqlCommentStore {
    pub fn new(endpoint: impl Into<String>, tokens: Arc<TokenManager>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            tokens,
        }
    }
}

#[async_trait]
impl CommentStore for GraphqlCommentStore {
    async fn add_comment(&self, comment: NewComment) -> Result<CommentId, CommentError> {
        let state = self.tokens.get_token().await;
        if let Some(error) = state.error {
            return Err(error.into());
        }
        let token = state.token.ok_or(CommentError::Unauthenticated)?;

        let request = serde_json::json!({
            "query": INSERT_COMMENT,
            "variables": { "object": comment },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CommentError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body: GraphQlResponse = serde_json::from_str(&text)
            .map_err(|e| CommentError::GraphQl(format!("{e}: {text}")))?;
        if let Some(error) = body.errors.into_iter().next() {
            return Err(CommentError::GraphQl(error.message));
        }

        body.data
            .and_then(|data| data.insert_comments_one)
            .map(|row| row.id)
            .ok_or_else(|| CommentError::GraphQl("no row returned".into()))
    }
}

/// Comments kept in memory, for offline sessions and tests
#[derive(Debug, Default)]
pub struct MemoryCommentStore {
    comments: Mutex<Vec<(CommentId, NewComment)>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comments(&self) -> Vec<(CommentId, NewComment)> {
        self.comments.lock().clone()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn add_comment(&self, comment: NewComment) -> Result<CommentId, CommentError> {
        let id = CommentId::new(uuid::Uuid::new_v4().to_string());
        self.comments.lock().push((id.clone(), comment));
        Ok(id)
    }
}
