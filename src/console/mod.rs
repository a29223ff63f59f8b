//! Query Console Session.
//!
//! ```text
//! IDLE --run--> RUNNING --ok--> SUCCEEDED
//!                       --err-> FAILED
//! ```
//!
//! A run is split in two so the caller can keep its event loop free:
//! [`QueryConsole::begin_run`] validates and hands out a [`PendingExecution`],
//! and [`QueryConsole::complete`] applies the [`Completion`] it produced.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{ConsoleTarget, QueryExecutor};
use crate::error::{DeckError, Result};
use crate::models::{QueryResult, TableSchema};
use crate::secret::OneTimePassword;

pub const DEFAULT_QUERY: &str = "SHOW TABLES;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsolePhase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Query,
    Schema,
}

#[derive(Debug)]
pub enum Outcome {
    Query(Result<QueryResult>),
    Schema(Result<Vec<TableSchema>>),
}

#[derive(Debug)]
pub struct Completion {
    pub session_id: Uuid,
    pub elapsed_ms: u64,
    pub outcome: Outcome,
}

/// One in-flight execution. Owns the password until the request resolves.
pub struct PendingExecution {
    session_id: Uuid,
    job: Job,
    target: ConsoleTarget,
    executor: Arc<dyn QueryExecutor>,
    query: String,
    password: OneTimePassword,
    timeout: Option<Duration>,
}

impl PendingExecution {
    pub async fn execute(self) -> Completion {
        let PendingExecution { session_id, job, target, executor, query, password, timeout } = self;
        let started = Instant::now();

        let outcome = match job {
            Job::Query => {
                let preview: String = query.chars().take(80).collect();
                debug!(%session_id, executor = executor.name(), query = %preview.replace('\n', " "), "executing query");
                let fut = executor.execute(&target, &query, password);
                Outcome::Query(with_timeout(timeout, fut).await)
            }
            Job::Schema => {
                let fut = executor.fetch_schema(&target, password);
                Outcome::Schema(with_timeout(timeout, fut).await)
            }
        };

        Completion {
            session_id,
            elapsed_ms: started.elapsed().as_millis() as u64,
            outcome,
        }
    }
}

// 密码不进 Debug 输出
impl std::fmt::Debug for PendingExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingExecution")
            .field("session_id", &self.session_id)
            .field("job", &self.job)
            .field("target", &self.target)
            .field("executor", &self.executor.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Completion {
    /// The error carried by a failed execution, if any.
    pub fn failure(&self) -> Option<DeckError> {
        match &self.outcome {
            Outcome::Query(Err(e)) | Outcome::Schema(Err(e)) => Some(e.clone()),
            _ => None,
        }
    }
}

async fn with_timeout<T>(timeout: Option<Duration>, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or(Err(DeckError::Timeout(limit))),
        None => fut.await,
    }
}

pub struct QueryConsole {
    session_id: Uuid,
    target: ConsoleTarget,
    executor: Arc<dyn QueryExecutor>,
    timeout: Option<Duration>,
    pub query: String,
    pub password: OneTimePassword,
    phase: ConsolePhase,
    result: Option<QueryResult>,
    error: Option<String>,
    elapsed_ms: Option<u64>,
    schema: Vec<TableSchema>,
}

impl QueryConsole {
    pub fn open(target: ConsoleTarget, executor: Arc<dyn QueryExecutor>, timeout: Option<Duration>) -> Self {
        let session_id = Uuid::new_v4();
        info!(%session_id, instance = %target.name, executor = executor.name(), "console opened");
        Self {
            session_id,
            target,
            executor,
            timeout,
            query: DEFAULT_QUERY.to_string(),
            password: OneTimePassword::default(),
            phase: ConsolePhase::Idle,
            result: None,
            error: None,
            elapsed_ms: None,
            schema: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid { self.session_id }
    pub fn target(&self) -> &ConsoleTarget { &self.target }
    pub fn phase(&self) -> ConsolePhase { self.phase }
    pub fn result(&self) -> Option<&QueryResult> { self.result.as_ref() }
    pub fn error(&self) -> Option<&str> { self.error.as_deref() }
    pub fn elapsed_ms(&self) -> Option<u64> { self.elapsed_ms }
    pub fn schema(&self) -> &[TableSchema] { &self.schema }
    pub fn is_running(&self) -> bool { self.phase == ConsolePhase::Running }
    pub fn requires_password(&self) -> bool { self.executor.requires_password() }

    /// Editing never clears the previous result or error.
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    pub fn push_char(&mut self, ch: char) {
        self.query.push(ch);
    }

    pub fn backspace(&mut self) {
        self.query.pop();
    }

    /// Reset text, result and error. An in-flight run keeps going.
    pub fn clear(&mut self) {
        self.query.clear();
        self.result = None;
        self.error = None;
        if self.phase != ConsolePhase::Running {
            self.phase = ConsolePhase::Idle;
        }
    }

    fn fail_validation(&mut self, msg: &str) -> DeckError {
        self.result = None;
        self.error = Some(msg.to_string());
        self.phase = ConsolePhase::Idle;
        DeckError::validation(msg)
    }

    fn begin(&mut self, job: Job) -> Result<Option<PendingExecution>> {
        if self.is_running() {
            return Ok(None);
        }
        if job == Job::Query && self.query.trim().is_empty() {
            return Err(self.fail_validation("Please enter a SQL query"));
        }
        if self.requires_password() && self.password.is_empty() {
            return Err(self.fail_validation("Please enter your database password"));
        }

        self.phase = ConsolePhase::Running;
        self.error = None;
        if job == Job::Query {
            self.result = None;
        }
        Ok(Some(PendingExecution {
            session_id: self.session_id,
            job,
            target: self.target.clone(),
            executor: self.executor.clone(),
            query: self.query.clone(),
            password: self.password.take(),
            timeout: self.timeout,
        }))
    }

    /// `Ok(None)` when a run is already in flight: nothing is issued.
    pub fn begin_run(&mut self) -> Result<Option<PendingExecution>> {
        self.begin(Job::Query)
    }

    pub fn begin_schema(&mut self) -> Result<Option<PendingExecution>> {
        self.begin(Job::Schema)
    }

    /// Apply a finished execution. Returns false for completions that belong
    /// to another console session.
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.session_id != self.session_id || !self.is_running() {
            debug!(session_id = %completion.session_id, "dropping stale completion");
            return false;
        }
        match completion.outcome {
            Outcome::Query(Ok(result)) => {
                self.elapsed_ms = Some(if result.elapsed_ms > 0 { result.elapsed_ms } else { completion.elapsed_ms });
                self.result = Some(result);
                self.error = None;
                self.phase = ConsolePhase::Succeeded;
            }
            Outcome::Schema(Ok(tables)) => {
                self.schema = tables;
                self.error = None;
                self.phase = if self.result.is_some() { ConsolePhase::Succeeded } else { ConsolePhase::Idle };
            }
            Outcome::Query(Err(e)) | Outcome::Schema(Err(e)) => {
                self.elapsed_ms = Some(completion.elapsed_ms);
                self.result = None;
                self.error = Some(e.to_string());
                self.phase = ConsolePhase::Failed;
            }
        }
        true
    }

    /// Validate, execute and apply in one go.
    pub async fn run(&mut self) -> Result<()> {
        let pending = self.begin_run()?;
        self.drive(pending).await
    }

    /// Fetch the table list with the same one-time password rules as [`run`](Self::run).
    pub async fn load_schema(&mut self) -> Result<()> {
        let pending = self.begin_schema()?;
        self.drive(pending).await
    }

    async fn drive(&mut self, pending: Option<PendingExecution>) -> Result<()> {
        let Some(pending) = pending else { return Ok(()) };
        let completion = pending.execute().await;
        let failure = completion.failure();
        self.complete(completion);
        failure.map_or(Ok(()), Err)
    }

    /// "5 rows returned (12ms)"
    pub fn status_line(&self) -> Option<String> {
        let result = self.result.as_ref()?;
        let message = result.message.as_deref().unwrap_or("Query OK");
        Some(format!("{} ({}ms)", message, self.elapsed_ms.unwrap_or(result.elapsed_ms)))
    }

    pub fn readiness(&self) -> &'static str {
        if self.is_running() {
            "Running..."
        } else if !self.requires_password() || !self.password.is_empty() {
            "Ready"
        } else {
            "Enter password to execute"
        }
    }
}
