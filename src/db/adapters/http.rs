use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::db::adapter::{ConsoleTarget, InstanceApi, InstanceListing, QueryExecutor};
use crate::db::credentials::CredentialProvider;
use crate::db::envelope::{
    Ack, CreateBody, ListEnvelope, QueryBody, QueryEnvelope, ResizeBody, RotateBody, SchemaEnvelope, StatsEnvelope,
};
use crate::error::{DeckError, Result};
use crate::models::{InstanceCollectionStats, NewInstanceDraft, QueryResult, TableSchema};
use crate::secret::OneTimePassword;

const CONNECT_FAILED: &str = "Failed to connect to server";

/// Live path: thin request/response mapping onto the hosting API.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    // 只作用于生命周期调用，查询的超时由控制台控制
    request_timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: Url, credentials: Arc<dyn CredentialProvider>, request_timeout: Duration) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("api url cannot be a base: {}", base_url));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base_url, credentials, request_timeout })
    }

    // <base>/databases/<segments...>
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("databases").extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let req = self.client.request(method, self.endpoint(segments));
        self.credentials.apply_to_request(req)
    }

    /// List, create, delete and the other instance calls carry the request timeout.
    fn lifecycle(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.request(method, segments).timeout(self.request_timeout)
    }

    fn transport_error(&self, request_id: Uuid, op: &str, err: reqwest::Error) -> DeckError {
        if err.is_timeout() {
            warn!(%request_id, op, "request timed out");
            DeckError::Timeout(self.request_timeout)
        } else {
            warn!(%request_id, op, error = %err, "request failed before a response arrived");
            DeckError::Transport(CONNECT_FAILED.to_string())
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, op: &str) -> Result<T> {
        let request_id = Uuid::new_v4();
        let req = req.header("X-Request-Id", request_id.to_string());
        let started = Instant::now();

        let resp = req.send().await.map_err(|e| self.transport_error(request_id, op, e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(request_id, op, e))?;
        debug!(%request_id, op, status = status.as_u16(), duration_ms = started.elapsed().as_millis() as u64, "response received");

        // 非 2xx 也先按信封解析，服务端的 message 要原样透出
        match serde_json::from_str::<T>(&text) {
            Ok(v) => Ok(v),
            Err(e) if status.is_success() => Err(DeckError::Decode(e.to_string())),
            Err(_) => {
                let body = text.trim();
                if body.is_empty() {
                    Err(DeckError::Server(format!("HTTP {}", status)))
                } else {
                    Err(DeckError::Server(body.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl InstanceApi for HttpGateway {
    async fn list_instances(&self) -> Result<InstanceListing> {
        let req = self.lifecycle(Method::GET, &[]);
        let env: ListEnvelope = self.send(req, "list").await?;
        env.into_listing()
    }

    async fn create_instance(&self, draft: &NewInstanceDraft) -> Result<()> {
        let body = CreateBody {
            database_name: draft.name.trim(),
            database_user: draft.user.trim(),
            database_password: draft.password.expose(),
            database_type: draft.engine.as_str(),
        };
        let req = self.lifecycle(Method::POST, &[]).json(&body);
        let ack: Ack = self.send(req, "create").await?;
        ack.into_result("Failed to create database")?;
        info!(name = %draft.name, engine = %draft.engine, "database created");
        Ok(())
    }

    async fn delete_instance(&self, id: i64) -> Result<()> {
        let id = id.to_string();
        let req = self.lifecycle(Method::DELETE, &[&id]);
        let ack: Ack = self.send(req, "delete").await?;
        ack.into_result("Failed to delete database")
    }

    async fn rotate_password(&self, id: i64, new_password: OneTimePassword) -> Result<()> {
        let id = id.to_string();
        let body = RotateBody { new_password: new_password.expose() };
        let req = self.lifecycle(Method::PUT, &[&id, "password"]).json(&body);
        let ack: Ack = self.send(req, "rotate_password").await?;
        ack.into_result("Failed to change password")
    }

    async fn fetch_stats(&self) -> Result<InstanceCollectionStats> {
        let req = self.lifecycle(Method::GET, &["stats"]);
        let env: StatsEnvelope = self.send(req, "stats").await?;
        env.into_stats()
    }

    async fn update_size_limit(&self, id: i64, max_size_mb: u32) -> Result<()> {
        let id = id.to_string();
        let req = self.lifecycle(Method::PUT, &[&id, "size"]).json(&ResizeBody { max_size_mb });
        let ack: Ack = self.send(req, "resize").await?;
        ack.into_result("Failed to update size limit")
    }
}

#[async_trait]
impl QueryExecutor for HttpGateway {
    fn name(&self) -> &'static str { "live" }

    async fn execute(&self, target: &ConsoleTarget, query: &str, password: OneTimePassword) -> Result<QueryResult> {
        let id = target.id.to_string();
        let body = QueryBody { query, password: password.expose() };
        let req = self.request(Method::POST, &[&id, "query"]).json(&body);
        drop(password);

        let started = Instant::now();
        let env: QueryEnvelope = self.send(req, "query").await?;
        env.into_result(started.elapsed().as_millis() as u64)
    }

    async fn fetch_schema(&self, target: &ConsoleTarget, password: OneTimePassword) -> Result<Vec<TableSchema>> {
        let id = target.id.to_string();
        let req = self
            .request(Method::GET, &[&id, "schema"])
            .header("X-Database-Password", password.expose());
        drop(password);

        let env: SchemaEnvelope = self.send(req, "schema").await?;
        env.into_tables()
    }
}
