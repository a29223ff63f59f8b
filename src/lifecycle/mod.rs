//! Instance Lifecycle Orchestrator.
//!
//! Owns the local instance collection and its derived stats. Remote calls
//! never hold the state lock, so several operations may be in flight at once;
//! each completion applies its own patch (replace on reload, remove by id, or
//! nothing for credential changes) and the last write observed wins.

mod dialogs;
mod filter;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::db::InstanceApi;
use crate::error::{DeckError, Result};
use crate::models::{DatabaseInstance, InstanceCollectionStats, NewInstanceDraft};
use crate::secret::OneTimePassword;

pub use dialogs::{ConfirmedDeletion, PendingDeletion, RotationDialog};
pub use filter::{filter_instances, EngineFilter, FilteredView};

#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub instances: Vec<DatabaseInstance>,
    pub stats: InstanceCollectionStats,
    pub loaded: bool,
}

/// A create call the orchestrator refused or the server rejected.
/// The draft comes back so the dialog keeps what the user typed.
#[derive(Debug)]
pub struct DraftRejected {
    pub draft: NewInstanceDraft,
    pub error: DeckError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    Reloaded,
    /// The server created the database but the follow-up reload failed.
    ReloadFailed(DeckError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsAudit {
    pub local: InstanceCollectionStats,
    pub remote: InstanceCollectionStats,
}

impl StatsAudit {
    pub fn consistent(&self) -> bool {
        self.local.total_databases == self.remote.total_databases
            && self.local.mysql_count == self.remote.mysql_count
            && self.local.postgres_count == self.remote.postgres_count
    }
}

pub struct InstanceOrchestrator {
    api: Arc<dyn InstanceApi>,
    state: Mutex<Collection>,
}

impl InstanceOrchestrator {
    pub fn new(api: Arc<dyn InstanceApi>) -> Self {
        Self { api, state: Mutex::new(Collection::default()) }
    }

    fn state(&self) -> MutexGuard<'_, Collection> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Collection {
        self.state().clone()
    }

    pub fn stats(&self) -> InstanceCollectionStats {
        self.state().stats.clone()
    }

    pub fn get(&self, id: i64) -> Option<DatabaseInstance> {
        self.state().instances.iter().find(|db| db.id == id).cloned()
    }

    pub fn filter(&self, search_term: &str, engine: EngineFilter) -> FilteredView {
        filter_instances(&self.state().instances, search_term, engine)
    }

    /// Replace the whole collection. On failure nothing changes.
    pub async fn load(&self) -> Result<()> {
        let listing = self.api.list_instances().await.map_err(|e| {
            warn!(error = %e, "failed to load databases");
            e
        })?;

        let stats = InstanceCollectionStats::derive(&listing.instances);
        if let Some(remote) = &listing.stats {
            if remote.total_databases != stats.total_databases {
                debug!(
                    remote = remote.total_databases,
                    local = stats.total_databases,
                    "server stats disagree with listing, using derived stats"
                );
            }
        }

        let mut state = self.state();
        state.instances = listing.instances;
        state.stats = stats;
        state.loaded = true;
        info!(count = state.instances.len(), "databases loaded");
        Ok(())
    }

    /// Validate locally, create remotely, then reload for the server-assigned id.
    pub async fn create(&self, draft: NewInstanceDraft) -> std::result::Result<Created, DraftRejected> {
        if let Err(error) = draft.validate() {
            return Err(DraftRejected { draft, error });
        }
        if let Err(error) = self.api.create_instance(&draft).await {
            warn!(name = %draft.name, error = %error, "create failed");
            return Err(DraftRejected { draft, error });
        }
        drop(draft);

        match self.load().await {
            Ok(()) => Ok(Created::Reloaded),
            Err(e) => Ok(Created::ReloadFailed(e)),
        }
    }

    /// First half of the destructive-action guard.
    pub fn prepare_delete(&self, id: i64) -> Result<PendingDeletion> {
        let db = self.get(id).ok_or(DeckError::NotFound(id))?;
        Ok(PendingDeletion::new(db.id, db.name))
    }

    /// Issues the delete. Only reachable with a confirmed guard.
    pub async fn delete(&self, confirmed: ConfirmedDeletion) -> Result<()> {
        let id = confirmed.id();
        self.api.delete_instance(id).await.map_err(|e| {
            warn!(id, error = %e, "delete failed");
            e
        })?;

        let mut state = self.state();
        state.instances.retain(|db| db.id != id);
        state.stats = InstanceCollectionStats::derive(&state.instances);
        info!(id, name = %confirmed.name(), "database deleted");
        Ok(())
    }

    /// Changes the database password. The collection is never touched.
    pub async fn rotate_credential(&self, id: i64, new_password: OneTimePassword) -> Result<()> {
        if new_password.is_empty() {
            return Err(DeckError::validation("Please enter a new password"));
        }
        if self.get(id).is_none() {
            return Err(DeckError::NotFound(id));
        }
        self.api.rotate_password(id, new_password).await.map_err(|e| {
            warn!(id, error = %e, "password change failed");
            e
        })?;
        info!(id, "password changed");
        Ok(())
    }

    /// Dialog-driven rotation: success closes the dialog, failure keeps it open.
    pub async fn submit_rotation(&self, dialog: &mut RotationDialog) -> Result<()> {
        let (id, password) = dialog.begin_submit()?;
        let outcome = self.rotate_credential(id, password).await;
        dialog.finish(outcome.clone());
        outcome
    }

    pub async fn resize(&self, id: i64, max_size_mb: u32) -> Result<()> {
        if max_size_mb == 0 {
            return Err(DeckError::validation("Size limit must be greater than 0 MB"));
        }
        if self.get(id).is_none() {
            return Err(DeckError::NotFound(id));
        }
        self.api.update_size_limit(id, max_size_mb).await?;
        self.load().await
    }

    /// Compare the locally derived stats with what the server reports.
    pub async fn audit_stats(&self) -> Result<StatsAudit> {
        let remote = self.api.fetch_stats().await?;
        Ok(StatsAudit { local: self.stats(), remote })
    }
}
